use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use std::fs;

const TOKEN_FILE: &str = ".mergington_token";

#[derive(Parser)]
#[command(name = "mergington-cli")]
#[command(about = "CLI for the Mergington activities API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, env = "MERGINGTON_URL", default_value = "http://localhost:8000")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    /// Show who the saved token belongs to
    Me,
    /// List activities and their rosters
    List,
    Signup {
        #[arg(short, long)]
        activity: String,
        #[arg(short, long)]
        email: String,
    },
    Unregister {
        #[arg(short, long)]
        activity: String,
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    username: String,
}

#[derive(Deserialize)]
struct ActivityView {
    schedule: String,
    max_participants: u32,
    participants: Vec<String>,
}

fn with_token(request: RequestBuilder) -> RequestBuilder {
    match fs::read_to_string(TOKEN_FILE) {
        Ok(token) => request.bearer_auth(token.trim()),
        Err(_) => request,
    }
}

/// `{base}/activities/{activity}/{action}` with the activity name percent-encoded
fn activity_url(
    base: &str,
    activity: &str,
    action: &str,
) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| "server url cannot be used as a base")?
        .pop_if_empty()
        .extend(["activities", activity, action]);
    Ok(url)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Login { username, password } => {
            let res = client
                .post(format!("{}/login", cli.url))
                .query(&[("username", &username), ("password", &password)])
                .send()
                .await?;
            if res.status().is_success() {
                let body: LoginResponse = res.json().await?;
                // Save token
                fs::write(TOKEN_FILE, body.access_token)?;
                println!("Logged in as {}. Token saved to {}", body.username, TOKEN_FILE);
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
        Commands::Me => {
            let res = with_token(client.get(format!("{}/me", cli.url))).send().await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::List => {
            let res = client.get(format!("{}/activities", cli.url)).send().await?;
            if !res.status().is_success() {
                println!("Response: {}", res.text().await?);
                return Ok(());
            }
            let activities: std::collections::BTreeMap<String, ActivityView> = res.json().await?;
            for (name, activity) in activities {
                println!(
                    "{} ({}) [{}/{}]",
                    name,
                    activity.schedule,
                    activity.participants.len(),
                    activity.max_participants
                );
                for email in activity.participants {
                    println!("  - {}", email);
                }
            }
        }
        Commands::Signup { activity, email } => {
            let url = activity_url(&cli.url, &activity, "signup")?;
            let res = with_token(client.post(url).query(&[("email", &email)]))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Unregister { activity, email } => {
            let url = activity_url(&cli.url, &activity, "unregister")?;
            let res = with_token(client.delete(url).query(&[("email", &email)]))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
    }

    Ok(())
}
