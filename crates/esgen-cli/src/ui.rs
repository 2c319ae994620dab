//! esgen CLI output primitives.

use console::style;

use esgen_compiler::FileStatus;

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const GREEN: Color = Color::Color256(82);
    pub const YELLOW: Color = Color::Color256(220);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const DOT: &str = "\u{00B7}"; // ·
    pub const PLUS: &str = "+";
    pub const TILDE: &str = "~";
}

/// Print compact version header
pub fn print_compact_header(version: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style("esgen").fg(colors::CYAN).bold(),
        style(version).dim()
    );
    println!();
}

pub fn success(msg: &str) {
    println!("  {} {}", style(symbols::TARGET_FILLED).fg(colors::GREEN), msg);
}

pub fn error(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

pub fn info(msg: &str) {
    println!("  {} {}", style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN), msg);
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// One generated file with what happened to it.
pub fn file_line(status: FileStatus, filename: &str) {
    match status {
        FileStatus::Created => println!(
            "    {} {}",
            style(symbols::PLUS).fg(colors::GREEN).bold(),
            style(filename).fg(colors::GREEN)
        ),
        FileStatus::Updated => println!(
            "    {} {}",
            style(symbols::TILDE).fg(colors::YELLOW).bold(),
            style(filename).fg(colors::YELLOW)
        ),
        FileStatus::Unchanged => println!("    {} {}", style(symbols::DOT).dim(), style(filename).dim()),
    }
}
