use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use tracing::{info, trace};

// Watch the power button through its sysfs GPIO value file
pub struct ButtonMonitor {
    value_path: PathBuf,

    // Set on the first press and never cleared
    triggered: bool,
}

impl ButtonMonitor {
    pub fn new(value_path: &Path) -> Self {
        Self {
            value_path: value_path.to_path_buf(),
            triggered: false,
        }
    }

    // Read the current line level, the button pulls the line low when pressed
    pub fn sample(&self) -> io::Result<bool> {
        let mut file = File::open(&self.value_path)?;

        let mut value = [0u8; 1];
        file.read_exact(&mut value)?;

        trace!("Power button line: {}", value[0] as char);

        Ok(value[0] == b'0')
    }

    // Return true exactly once, on the first sample that reads pressed
    pub fn poll_press(&mut self) -> io::Result<bool> {
        if self.triggered {
            return Ok(false);
        }

        if self.sample()? {
            info!("Power button pressed");
            self.triggered = true;

            return Ok(true);
        }

        Ok(false)
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn value_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("dns320ld-button-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("value");
        fs::write(&path, content).unwrap();

        path
    }

    fn remove_value_file(path: &Path) {
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn zero_means_pressed() {
        let path = value_file("pressed", "0\n");
        let pressed = ButtonMonitor::new(&path).sample();
        remove_value_file(&path);

        assert!(pressed.unwrap());
    }

    #[test]
    fn anything_else_means_released() {
        for (name, content) in [("one", "1\n"), ("other", "x")] {
            let path = value_file(name, content);
            let pressed = ButtonMonitor::new(&path).sample();
            remove_value_file(&path);

            assert!(!pressed.unwrap());
        }
    }

    #[test]
    fn missing_source_is_an_error() {
        let monitor = ButtonMonitor::new(Path::new("/nonexistent/gpio29/value"));

        assert!(monitor.sample().is_err());
    }

    #[test]
    fn empty_source_is_an_error() {
        let path = value_file("empty", "");
        let result = ButtonMonitor::new(&path).sample();
        remove_value_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn press_latches_once() {
        let path = value_file("latch", "1");
        let mut monitor = ButtonMonitor::new(&path);

        assert!(!monitor.poll_press().unwrap());

        fs::write(&path, "0").unwrap();
        assert!(monitor.poll_press().unwrap());
        assert!(monitor.triggered());

        // Still pressed, but the event was already reported
        assert!(!monitor.poll_press().unwrap());

        fs::write(&path, "1").unwrap();
        assert!(!monitor.poll_press().unwrap());
        assert!(monitor.triggered());

        remove_value_file(&path);
    }
}
