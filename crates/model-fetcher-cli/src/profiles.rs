use clap::Subcommand;

use model_fetcher_core::{Profile, ProfileStore};

#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List saved profiles (`*` marks the active one)
    List,
    /// Create a profile
    Add {
        name: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        key: String,
        /// Make the new profile active
        #[arg(long)]
        activate: bool,
    },
    /// Delete a profile
    Remove { name: String },
    /// Make a profile the active one
    Use { name: String },
    /// Change a profile's URL and/or key
    Edit {
        name: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        key: Option<String>,
    },
    /// Show one profile
    Show {
        name: String,
        /// Print the API key in full
        #[arg(long)]
        reveal: bool,
    },
    /// Delete all saved profiles
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },
    /// Print the config directory
    Path,
}

pub fn run(store: &ProfileStore, cmd: ProfilesCommand) -> anyhow::Result<()> {
    match cmd {
        ProfilesCommand::List => {
            let set = store.load()?;
            if set.is_empty() {
                eprintln!("No saved profiles. Create one with `profiles add <NAME> --url <URL>`.");
            }
            for profile in set.iter() {
                println!("{}", list_line(profile));
            }
        }
        ProfilesCommand::Add {
            name,
            url,
            key,
            activate,
        } => {
            let mut profile = Profile::new(&name, &url, &key)?;
            profile.is_active = activate;
            store.add(profile)?;
            eprintln!("Created profile {:?}", name.trim());
        }
        ProfilesCommand::Remove { name } => {
            store.remove(&name)?;
            eprintln!("Deleted profile {:?}", name);
        }
        ProfilesCommand::Use { name } => {
            store.set_active(&name)?;
            eprintln!("Active profile: {}", name);
        }
        ProfilesCommand::Edit { name, url, key } => {
            if url.is_none() && key.is_none() {
                anyhow::bail!("nothing to change; pass --url and/or --key");
            }
            store.update(&name, url.as_deref(), key.as_deref())?;
            eprintln!("Updated profile {:?}", name);
        }
        ProfilesCommand::Show { name, reveal } => {
            let set = store.load()?;
            let Some(profile) = set.get(&name) else {
                anyhow::bail!("no saved profile named {:?}", name);
            };
            let key = if reveal {
                profile.api_key.clone()
            } else {
                mask_key(&profile.api_key)
            };
            println!("name:         {}", profile.name);
            println!("base_url:     {}", profile.base_url);
            println!("api_key:      {}", key);
            println!("active:       {}", profile.is_active);
            println!("last_updated: {}", profile.last_updated.to_rfc3339());
        }
        ProfilesCommand::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete all profiles without --yes");
            }
            store.clear()?;
            eprintln!("All profiles cleared");
        }
        ProfilesCommand::Path => {
            println!("{}", store.location().display());
        }
    }
    Ok(())
}

fn list_line(profile: &Profile) -> String {
    let marker = if profile.is_active { '*' } else { ' ' };
    let url = if profile.is_configured() {
        profile.base_url.as_str()
    } else {
        "(no base URL)"
    };
    format!("{} {}\t{}", marker, profile.name, url)
}

/// Keep only the ends of a key visible.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return "(none)".to_string();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
