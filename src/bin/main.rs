use fintech_advisor::{
    config::AdvisorConfig,
    conversation::{ConversationController, ConversationState},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BANNER: &str = "Smart Fintech Assistant
Ask me anything about your financial goals: saving, investing, budgeting, loans, retirement, and more!
Type /reset to start a new conversation, /quit to leave.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the chat
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AdvisorConfig::from_env()?;
    let controller = ConversationController::from_config(&config)?;
    let mut state = ConversationState::new();

    info!(model = %config.gemini_model, "Terminal chat starting");
    println!("{}\n", BANNER);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                controller.reset(&mut state);
                println!("Started a new conversation. Tell me your financial goal.\n");
                continue;
            }
            _ => {}
        }

        let reply = controller.respond(&mut state, input).await?;
        println!("\n{}\n", reply);

        if let Some(progress) = state.progress() {
            println!("(Question {} of {})\n", progress.current, progress.total);
        }
    }

    Ok(())
}
