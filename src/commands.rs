use crate::clock::Clock;
use crate::config::Config;
use crate::error::CommandError;
use crate::identity::IdentityProvider;
use crate::model::{Link, LinkStatus};
use crate::registry::LinkRegistry;
use crate::utils::parse_positive;
use chrono::Duration;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  create <url> <max_clicks>   create a short link living for the default ttl
  list                        show your links with clicks used and expiry
  open <code|short_url>       follow a short link (counts one click)
  limit <code> <max_clicks>   change the click limit of your link
  ttl <code> <hours>          change the time-to-live of your link
  delete <code>               delete your link
  help                        show this help
  exit                        quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { url: String, max_clicks: u32 },
    List,
    Open { code: String },
    Limit { code: String, max_clicks: u32 },
    Ttl { code: String, hours: u32 },
    Delete { code: String },
    Help,
    Exit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let mut arg = |what: &'static str| {
            words
                .next()
                .map(str::to_string)
                .ok_or(CommandError::MissingArgument(what))
        };
        let command = match name {
            "create" => Command::Create {
                url: arg("url")?,
                max_clicks: parse_positive("max_clicks", &arg("max_clicks")?)?,
            },
            "list" => Command::List,
            "open" => Command::Open { code: arg("code")? },
            "limit" => Command::Limit {
                code: arg("code")?,
                max_clicks: parse_positive("max_clicks", &arg("max_clicks")?)?,
            },
            "ttl" => Command::Ttl {
                code: arg("code")?,
                hours: parse_positive("hours", &arg("hours")?)?,
            },
            "delete" => Command::Delete { code: arg("code")? },
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Exit(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Continue(message) | Outcome::Exit(message) => message,
        }
    }
}

/// Line-oriented front end over a shared registry, acting for one session owner.
pub struct Console<C, I> {
    registry: Arc<LinkRegistry>,
    config: Config,
    clock: C,
    identity: I,
}

impl<C: Clock, I: IdentityProvider> Console<C, I> {
    pub fn new(registry: Arc<LinkRegistry>, config: Config, clock: C, identity: I) -> Self {
        Self {
            registry,
            config,
            clock,
            identity,
        }
    }

    /// Reads commands until `exit` or end of input. Sweeps expired links after every
    /// command. No registry lock is held while waiting for input.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let greeting = format!(
            "Your id: {}\nType `help` for the list of commands.\n",
            self.identity.current_owner()
        );
        output.write_all(greeting.as_bytes()).await?;
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let outcome = self.handle_line(&line);
            output.write_all(outcome.message().as_bytes()).await?;
            output.write_all(b"\n").await?;
            if let Outcome::Exit(_) = outcome {
                break;
            }
        }
        output.flush().await
    }

    pub fn handle_line(&self, line: &str) -> Outcome {
        let outcome = match line.parse::<Command>() {
            Ok(command) => self.execute(command),
            Err(err) => Outcome::Continue(format!("Error: {err}")),
        };
        self.registry.sweep_expired(self.clock.now());
        outcome
    }

    pub fn execute(&self, command: Command) -> Outcome {
        let owner = self.identity.current_owner();
        let now = self.clock.now();
        let message = match command {
            Command::Create { url, max_clicks } => {
                let ttl = self.config.default_ttl();
                match self.registry.create(&url, owner, max_clicks, ttl, now) {
                    Ok(link) => format!(
                        "Short link created: {}\nLifetime: {} hours, click limit: {}",
                        self.config.short_url(link.short_code()),
                        ttl.num_hours(),
                        max_clicks
                    ),
                    Err(err) => format!("Error: {err}"),
                }
            }
            Command::List => self.list(),
            Command::Open { code } => self.open(self.config.code_from_input(&code)),
            Command::Limit { code, max_clicks } => {
                let code = self.config.code_from_input(&code);
                if self.registry.update_max_clicks(code, max_clicks, &owner) {
                    format!("Click limit updated to {max_clicks}")
                } else {
                    "Could not update the click limit (link not found or not yours)".to_string()
                }
            }
            Command::Ttl { code, hours } => {
                let code = self.config.code_from_input(&code);
                let ttl = Duration::hours(i64::from(hours));
                if self.registry.update_ttl(code, ttl, &owner) {
                    format!("Lifetime updated to {hours} hours")
                } else {
                    "Could not update the lifetime (link not found or not yours)".to_string()
                }
            }
            Command::Delete { code } => {
                let code = self.config.code_from_input(&code);
                if self.registry.delete_owned(code, &owner) {
                    "Link deleted".to_string()
                } else {
                    "Link not found or owned by someone else".to_string()
                }
            }
            Command::Help => HELP.to_string(),
            Command::Exit => return Outcome::Exit("Goodbye!".to_string()),
        };
        Outcome::Continue(message)
    }

    fn list(&self) -> String {
        let now = self.clock.now();
        let mut links = self.registry.find_by_owner(&self.identity.current_owner());
        if links.is_empty() {
            return "You have no links yet".to_string();
        }
        links.sort_by_key(Link::created_at);
        let mut out = String::from("Your links:");
        for link in links {
            let _ = write!(
                out,
                "\n{} -> {} | clicks: {}/{} | expired: {}",
                self.config.short_url(link.short_code()),
                link.original_url(),
                link.used_clicks(),
                link.max_clicks(),
                if link.is_expired(now) { "yes" } else { "no" }
            );
        }
        out
    }

    fn open(&self, code: &str) -> String {
        let now = self.clock.now();
        // Look before resolving so a blocked link can be told apart from a missing one.
        let status = self.registry.find_by_code(code).map(|link| link.status(now));
        match self.registry.resolve(code, now) {
            Some(link) => {
                let mut message = format!("Redirecting to: {}", link.original_url());
                if link.is_limit_reached() {
                    message.push_str("\nWarning: the click limit of this link is now used up");
                }
                message
            }
            None => match status {
                None => "Error: link not found".to_string(),
                Some(LinkStatus::Expired) => "Error: the link has expired".to_string(),
                Some(LinkStatus::LimitReached) => {
                    "Error: the click limit of this link is used up".to_string()
                }
                Some(LinkStatus::Active) => "Error: link unavailable".to_string(),
            },
        }
    }
}
