use std::path::PathBuf;

use anyhow::Context;
use clap::Args as ClapArgs;
use tracing::info;

use model_fetcher_core::{
    view, FetchError, ModelClient, ModelFetcher, Profile, ProfileSet, ProfileStore,
    DEFAULT_TIMEOUT_SECS,
};

use crate::clipboard;

/// Profile that `--save` writes to when none is named or active.
const DEFAULT_PROFILE: &str = "default";

#[derive(ClapArgs, Debug)]
pub struct FetchArgs {
    /// Saved profile to use (default: the active profile)
    #[arg(short, long)]
    profile: Option<String>,

    /// Base URL, e.g. https://api.openai.com/v1 (overrides the profile)
    #[arg(long)]
    url: Option<String>,

    /// API key (overrides the profile)
    #[arg(long)]
    key: Option<String>,

    /// Only show model ids containing this text (case-insensitive)
    #[arg(short, long)]
    filter: Option<String>,

    /// Write the shown ids to model_ids_<timestamp>.txt in DIR (default: .)
    #[arg(long, num_args = 0..=1, default_missing_value = ".")]
    export: Option<PathBuf>,

    /// Copy the shown ids to the clipboard, or only ID if given
    #[arg(long, value_name = "ID", num_args = 0..=1)]
    copy: Option<Option<String>>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Save the URL and key into the profile after a successful fetch
    #[arg(long)]
    save: bool,
}

/// Credentials a fetch runs with, and where they came from.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    profile: Option<String>,
    base_url: String,
    api_key: String,
}

fn resolve_target(store: &ProfileStore, args: &FetchArgs) -> anyhow::Result<Target> {
    // Explicit --url and --key need nothing from the store.
    let needs_profile = args.profile.is_some() || args.url.is_none() || args.key.is_none();
    let set = if needs_profile {
        store.load()?
    } else {
        ProfileSet::new()
    };
    let profile = match &args.profile {
        Some(name) => Some(
            set.get(name)
                .with_context(|| format!("no saved profile named {:?}", name))?,
        ),
        None => set.active(),
    };

    let base_url = args
        .url
        .clone()
        .or_else(|| profile.map(|p| p.base_url.clone()))
        .unwrap_or_default();
    let api_key = args
        .key
        .clone()
        .or_else(|| profile.map(|p| p.api_key.clone()))
        .unwrap_or_default();

    if base_url.trim().is_empty() {
        match profile {
            Some(p) => anyhow::bail!(
                "profile {:?} has no base URL; set one with `profiles edit {} --url <URL>` or pass --url",
                p.name,
                p.name
            ),
            None => anyhow::bail!("no active profile; pass --url or select one with `profiles use <NAME>`"),
        }
    }

    Ok(Target {
        profile: profile.map(|p| p.name.clone()),
        base_url: base_url.trim().to_string(),
        api_key: api_key.trim().to_string(),
    })
}

pub async fn run(store: &ProfileStore, args: FetchArgs) -> anyhow::Result<()> {
    let target = resolve_target(store, &args)?;
    let client = ModelClient::with_timeout(args.timeout).map_err(report)?;
    let mut fetcher = ModelFetcher::new(client);

    eprintln!("Fetching model list from {} ...", target.base_url);
    let handle = fetcher.start(&target.base_url, &target.api_key)?;

    let result = tokio::select! {
        result = handle.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            fetcher.cancel();
            None
        }
    };
    let Some(result) = result else {
        anyhow::bail!("fetch cancelled");
    };
    let models = result.map_err(report)?;

    if models.is_empty() {
        eprintln!("No models found");
    } else {
        eprintln!("Fetched {} models", models.len());
    }

    if args.save {
        save_credentials(store, &target)?;
    }

    let shown = match &args.filter {
        Some(query) => view::filter(&models, query),
        None => models.iter().collect(),
    };
    for model in &shown {
        println!("{}", model.id);
    }
    if args.filter.is_some() {
        eprintln!("{} of {} models match", shown.len(), models.len());
    }

    if let Some(dir) = &args.export {
        let path = view::export(shown.iter().copied(), dir)?;
        eprintln!("Exported to {}", path.display());
    }

    if let Some(choice) = &args.copy {
        let text = clipboard::selection(&shown, choice.as_deref())?;
        clipboard::copy_text(&text)?;
        eprintln!("Copied {} to clipboard", describe_copy(&text));
    }

    Ok(())
}

/// Write the credentials that just worked back into their profile, creating
/// and activating it if needed.
fn save_credentials(store: &ProfileStore, target: &Target) -> anyhow::Result<()> {
    let name = target.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    let set = store.load()?;

    if set.contains(name) {
        store.update(name, Some(&target.base_url), Some(&target.api_key))?;
    } else {
        let mut profile = Profile::new(name, &target.base_url, &target.api_key)?;
        profile.is_active = set.active().is_none();
        store.add(profile)?;
    }

    info!("Saved credentials to profile {}", name);
    eprintln!("Saved to profile {:?}", name);
    Ok(())
}

fn describe_copy(text: &str) -> String {
    match text.lines().count() {
        1 => text.to_string(),
        n => format!("{} model ids", n),
    }
}

fn report(err: FetchError) -> anyhow::Error {
    anyhow::anyhow!("{}\nhint: {}", err.message, err.hint)
}
