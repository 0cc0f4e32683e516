//! Prints the summary for each headline given on argv, or one per stdin line.
//! Handy when editing a rule file: `DIGEST_RULES_PATH=my.toml normalize_demo "..."`.

use std::io::{self, BufRead};

use jp_commerce_digest::normalize::{normalize_title, rules::load_rules_default};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let rules = load_rules_default()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let titles: Vec<String> = if args.is_empty() {
        io::stdin().lock().lines().collect::<Result<_, _>>()?
    } else {
        args
    };

    for t in &titles {
        println!("{t}\n  -> {}", normalize_title(&rules, t));
    }
    Ok(())
}
