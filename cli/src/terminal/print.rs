use std::fmt::Display;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 10;
const TREE_KEY_WIDTH: usize = 7;

pub const AUTHORIZED_USE_NOTICE: &str = "Only scan hosts you own or are authorized to test";

/// Prints a raw line through the logging pipeline so it never tears the spinner.
#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

/// `-qq` and beyond print one compact line per result instead of a tree.
pub fn is_compact(q_level: u8) -> bool {
    !matches!(q_level, 0 | 1)
}

pub fn print(msg: &str) {
    info!(target: "probr::print", raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ PROBR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let side: usize = TOTAL_WIDTH.saturating_sub(text_width) / 2;
    let text: ColoredString = text_content.color(colors::PRIMARY).bold();
    let sep: ColoredString = "═".repeat(side).color(colors::SEPARATOR);

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg.to_uppercase());
    let msg_len: usize = UnicodeWidthStr::width(formatted.as_str());

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: String = format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        formatted.color(colors::PRIMARY),
        "─".repeat(right).color(colors::SEPARATOR)
    );

    print(&line);
}

pub fn authorized_use_notice() {
    let mark: ColoredString = "!".color(colors::FAILURE).bold();
    print(&format!("{mark} {}", AUTHORIZED_USE_NOTICE.color(colors::TEXT_DEFAULT).italic()));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR);
    print(&sep.to_string());
}

pub fn aligned_line<V>(key: &str, value: V)
where
    V: Display + WithDefaultColor,
{
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let output: String = format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );
    print(&output);
}

pub fn as_tree_one_level(key_value_pair: &[(String, ColoredString)]) {
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if last {
            "└─".color(colors::SEPARATOR)
        } else {
            "├─".color(colors::SEPARATOR)
        };
        let dots: ColoredString = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len())).color(colors::SEPARATOR);
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            dots,
            ":".color(colors::SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}{space}"));
}

pub fn no_results(what: &str) {
    centerln(&format!("no {what} found").color(colors::FAILURE).bold().to_string());
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_past_two_stays_compact() {
        assert!(!is_compact(0));
        assert!(!is_compact(1));
        for q_level in 2..=u8::MAX {
            assert!(is_compact(q_level), "-q x{q_level} should be compact");
        }
    }
}
