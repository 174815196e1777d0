use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "room-cli")]
#[command(about = "Command-line client for the tic-tac-toe room server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server answers on `/`
    Ping,
    /// Create a new room
    Create,
    /// Join a room and print the WebSocket URL and token
    Join {
        room_id: String,
        player_name: String,
    },
    /// Show a room's status
    Status { room_id: String },
    /// Vote on a rematch after a finished game
    Rematch {
        room_id: String,
        token: String,
        /// Vote against the rematch
        #[arg(long)]
        decline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/", base)).send().await?;
            println!("{} {}", res.status(), res.text().await?);
        }
        Commands::Create => {
            let res = client.post(format!("{}/rooms/create", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Join { room_id, player_name } => {
            let res = client
                .post(format!("{}/rooms/join", base))
                .json(&json!({ "room_id": room_id, "player_name": player_name }))
                .send()
                .await?;
            if let Some(body) = print_response(res).await? {
                if let (Some(path), Some(token)) =
                    (body["websocket_redirect"].as_str(), body["token"].as_str())
                {
                    let ws_base = base
                        .replacen("https://", "wss://", 1)
                        .replacen("http://", "ws://", 1);
                    println!("connect: {}{}?token={}", ws_base, path, token);
                }
            }
        }
        Commands::Status { room_id } => {
            let res = client.get(format!("{}/rooms/{}", base, room_id)).send().await?;
            print_response(res).await?;
        }
        Commands::Rematch {
            room_id,
            token,
            decline,
        } => {
            let res = client
                .post(format!("{}/rooms/{}/rematch", base, room_id))
                .json(&json!({ "token": token, "vote": !decline }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(
    res: reqwest::Response,
) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let json: Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(_) => {
            eprintln!("Error: server returned status {}", status);
            eprintln!("Response: {}", text);
            return Ok(None);
        }
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        return Ok(None);
    }
    Ok(Some(json))
}
