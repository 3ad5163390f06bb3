//! Synthetic keyboard and mouse input.
//!
//! The production injector shells out to `xdotool`, the same way the git
//! adapter shells out to `git`: one short-lived subprocess per event, bounded
//! by a timeout, any failure fatal.

use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::instrument;

use crate::core::action::Point;
use crate::core::keys::Key;
use crate::io::process::{DEFAULT_OUTPUT_LIMIT_BYTES, run_command_with_timeout};

/// Keyboard/mouse injection capability.
pub trait InputInjector {
    fn move_to(&mut self, at: Point) -> Result<()>;
    /// Left click at the current pointer position.
    fn click(&mut self) -> Result<()>;
    fn press_key(&mut self, key: &Key) -> Result<()>;
    /// Press all keys together (e.g. `ctrl` + `v`).
    fn press_chord(&mut self, keys: &[Key]) -> Result<()>;
}

/// Injector driving the X server through the `xdotool` CLI.
#[derive(Debug, Clone)]
pub struct Xdotool {
    program: String,
    timeout: Duration,
}

impl Xdotool {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn run(&self, args: &[String]) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        let output = run_command_with_timeout(cmd, self.timeout, DEFAULT_OUTPUT_LIMIT_BYTES)?;
        if !output.success() {
            return Err(anyhow!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                output.failure_summary(self.timeout)
            ));
        }
        Ok(())
    }
}

impl InputInjector for Xdotool {
    #[instrument(skip_all, fields(x = at.x, y = at.y))]
    fn move_to(&mut self, at: Point) -> Result<()> {
        self.run(&[
            "mousemove".to_string(),
            "--".to_string(),
            at.x.to_string(),
            at.y.to_string(),
        ])
    }

    fn click(&mut self) -> Result<()> {
        self.run(&["click".to_string(), "1".to_string()])
    }

    fn press_key(&mut self, key: &Key) -> Result<()> {
        self.run(&chord_args(std::slice::from_ref(key)))
    }

    fn press_chord(&mut self, keys: &[Key]) -> Result<()> {
        self.run(&chord_args(keys))
    }
}

/// `xdotool key` arguments pressing `keys` together.
fn chord_args(keys: &[Key]) -> Vec<String> {
    let combo: Vec<String> = keys.iter().map(keysym).collect();
    vec!["key".to_string(), "--".to_string(), combo.join("+")]
}

/// Map an automation key name to an X keysym understood by `xdotool`.
///
/// Single characters and unknown names pass through unchanged.
pub fn keysym(key: &Key) -> String {
    let name = key.as_str();
    let mapped = match name {
        "enter" | "return" => "Return",
        "ctrl" | "control" | "ctrlleft" => "ctrl",
        "ctrlright" => "Control_R",
        "shift" | "shiftleft" => "shift",
        "shiftright" => "Shift_R",
        "alt" | "altleft" | "option" => "alt",
        "altright" => "Alt_R",
        "win" | "winleft" | "super" | "command" | "cmd" => "super",
        "tab" => "Tab",
        "esc" | "escape" => "Escape",
        "space" => "space",
        "backspace" => "BackSpace",
        "delete" | "del" => "Delete",
        "insert" => "Insert",
        "home" => "Home",
        "end" => "End",
        "pageup" | "pgup" => "Prior",
        "pagedown" | "pgdn" => "Next",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "capslock" => "Caps_Lock",
        "printscreen" | "prtsc" => "Print",
        _ => {
            if let Some(n) = name.strip_prefix('f')
                && let Ok(n) = n.parse::<u8>()
                && (1..=24).contains(&n)
            {
                return format!("F{n}");
            }
            return name.to_string();
        }
    };
    mapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> String {
        keysym(&Key::parse(name).expect("key"))
    }

    #[test]
    fn maps_common_names() {
        assert_eq!(sym("enter"), "Return");
        assert_eq!(sym("Ctrl"), "ctrl");
        assert_eq!(sym("esc"), "Escape");
        assert_eq!(sym("pagedown"), "Next");
        assert_eq!(sym("win"), "super");
    }

    #[test]
    fn chord_joins_keysyms_with_plus() {
        let keys = [
            Key::parse("ctrl").expect("key"),
            Key::parse("v").expect("key"),
        ];
        assert_eq!(chord_args(&keys), vec!["key", "--", "ctrl+v"]);
        assert_eq!(
            chord_args(&[Key::parse("enter").expect("key")]),
            vec!["key", "--", "Return"]
        );
    }

    #[test]
    fn maps_function_keys() {
        assert_eq!(sym("f5"), "F5");
        assert_eq!(sym("F12"), "F12");
    }

    #[test]
    fn single_characters_pass_through() {
        assert_eq!(sym("v"), "v");
        assert_eq!(sym("7"), "7");
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_reported() {
        let mut injector = Xdotool::new("false", Duration::from_secs(5));
        let err = injector.click().expect_err("false exits non-zero");
        assert!(err.to_string().contains("false click 1 failed"));
    }
}
