//! Natural-language translation example
//!
//! Translates a search query or a bulk change instruction and prints the
//! result envelope as JSON. Without an API key the keyword parser is used.
//!
//! To run this example:
//! ```
//! OPENAI_API_KEY=your_api_key cargo run --example translate -- query "engineers in SF hired in 2023"
//! cargo run --example translate -- changes "give everyone a 20% bonus" 12
//! ```

use anyhow::{bail, Context, Result};
use hr_translate_sdk::{change_translator, query_translator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "query".to_string());
    let text = args
        .next()
        .context("usage: translate <query|changes> \"<text>\" [selected_count]")?;

    let output = match mode.as_str() {
        "query" => {
            let envelope = query_translator().translate_query(&text).await;
            if !envelope.payload.is_empty() {
                println!("-- {}", envelope.payload.to_query_syntax());
            }
            serde_json::to_string_pretty(&envelope)?
        }
        "changes" => {
            let selected_count = match args.next() {
                Some(count) => count.parse::<usize>().context("selected_count must be a number")?,
                None => 1,
            };
            let envelope = change_translator().translate_changes(&text, selected_count).await;
            serde_json::to_string_pretty(&envelope)?
        }
        other => bail!("unknown mode {:?}, expected \"query\" or \"changes\"", other),
    };

    println!("{}", output);
    Ok(())
}
