pub mod data;
pub mod export;
pub mod scrape;
pub mod settings;

use colored::Colorize;

const BANNER: &str = r#"
                                          _
 _ __  _ __ ___  ___ _ __   ___  ___  ___| |_
| '_ \| '__/ _ \/ __| '_ \ / _ \/ __|/ _ \ __|
| |_) | | | (_) \__ \ |_) |  __/ (__|  __/ |_
| .__/|_|  \___/|___/ .__/ \___|\___|\___|\__|
|_|                 |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan());
    println!(
        "  {} v{} - industry profile harvester",
        "prospect".bright_white().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
