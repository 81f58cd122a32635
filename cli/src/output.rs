use colored::Colorize;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn hint(msg: &str) {
    println!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "info:".blue().bold(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Aligned `name: value` line.
pub fn field(name: &str, value: &str) {
    println!("  {:<20} {}", format!("{name}:"), value.cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_does_not_panic() {
        header("Test Header");
    }

    #[test]
    fn test_hint_does_not_panic() {
        hint("This is a hint");
    }

    #[test]
    fn test_info_does_not_panic() {
        info("This is info");
    }

    #[test]
    fn test_warn_does_not_panic() {
        warn("This is a warning");
    }

    #[test]
    fn test_success_does_not_panic() {
        success("This is success");
    }

    #[test]
    fn test_field_does_not_panic() {
        field("classification", "new-fresh");
    }
}
