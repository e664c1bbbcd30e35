//! virgool-post - Cross-post a local article to a Virgool account

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use libvirgool::{
    ApiClient, Config, Credentials, CrossPoster, LinkStore, PostVisibility, Result, VirgoolError,
};

#[derive(Parser, Debug)]
#[command(name = "virgool-post")]
#[command(about = "Cross-post a local article to a Virgool account", long_about = None)]
struct Cli {
    /// Local identifier of the article (used for idempotence tracking)
    #[arg(long)]
    id: String,

    /// Article title
    #[arg(long)]
    title: String,

    /// File holding the article body (reads from stdin if not provided)
    #[arg(long)]
    body_file: Option<PathBuf>,

    /// Short excerpt, sent as the Open Graph description
    #[arg(long)]
    excerpt: Option<String>,

    /// Tag for the article (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// URL slug of the source article (derived from the title if not provided)
    #[arg(long)]
    slug: Option<String>,

    /// Local path of the primary image to upload
    #[arg(long)]
    image: Option<PathBuf>,

    /// Publish status (draft or publish); overrides the configured default
    #[arg(long)]
    status: Option<String>,

    /// Only check whether the article was already cross-posted
    #[arg(long)]
    check: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libvirgool::logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let links = LinkStore::new(&config.links.path).await?;

    if cli.check {
        let linked = links.has_link(&cli.id).await?;
        match cli.format.as_str() {
            "json" => println!(
                "{}",
                serde_json::json!({"id": cli.id, "cross_posted": linked})
            ),
            _ => println!(
                "{} is {}cross-posted",
                cli.id,
                if linked { "" } else { "not " }
            ),
        }
        return Ok(());
    }

    let visibility = match &cli.status {
        Some(status) => status.parse::<PostVisibility>()?,
        None => config.api.visibility()?,
    };

    let body = read_body(&cli)?;
    let item = libvirgool::ContentItem {
        id: cli.id.clone(),
        slug: cli.slug.clone().unwrap_or_else(|| slugify(&cli.title)),
        title: cli.title.clone(),
        body,
        excerpt: cli.excerpt.clone(),
        tags: cli.tags.clone(),
        primary_image: cli.image.clone(),
    };

    let credentials = Credentials {
        username: config.api.username.clone(),
        password: config.api.resolve_password()?,
    };

    let api = match &config.api.base_url {
        Some(base) => ApiClient::with_base_url(base)?,
        None => ApiClient::new()?,
    };

    let poster = CrossPoster::new(
        api,
        links,
        credentials,
        visibility,
        config.api.upload_folder.clone(),
    );

    let remote = poster.cross_post(&item).await?;

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(remote.as_value())
            .map_err(|e| VirgoolError::InvalidInput(e.to_string()))?),
        _ => println!(
            "Cross-posted {} as {}",
            cli.id,
            remote.id().unwrap_or("(no id)")
        ),
    }

    Ok(())
}

fn read_body(cli: &Cli) -> Result<String> {
    let body = match &cli.body_file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            VirgoolError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .map_err(|e| VirgoolError::InvalidInput(format!("cannot read stdin: {}", e)))?;
            body
        }
    };

    if body.trim().is_empty() {
        return Err(VirgoolError::InvalidInput(
            "article body is empty".to_string(),
        ));
    }
    Ok(body)
}

/// Derive a URL slug from the title: lowercase words joined by hyphens.
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_body_file(path: &std::path::Path) -> Cli {
        Cli::parse_from([
            "virgool-post",
            "--id",
            "1",
            "--title",
            "Title",
            "--body-file",
            path.to_str().unwrap(),
        ])
    }

    #[test]
    fn test_read_body_rejects_empty_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("body.html");
        std::fs::write(&path, "  \n\t ").unwrap();

        match read_body(&cli_with_body_file(&path)) {
            Err(VirgoolError::InvalidInput(message)) => {
                assert!(message.contains("body is empty"));
            }
            other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_read_body_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("body.html");
        std::fs::write(&path, "<p>Body.</p>").unwrap();

        assert_eq!(read_body(&cli_with_body_file(&path)).unwrap(), "<p>Body.</p>");
    }

    #[test]
    fn test_read_body_missing_file() {
        let path = std::path::Path::new("/nonexistent/body.html");
        assert!(matches!(
            read_body(&cli_with_body_file(path)),
            Err(VirgoolError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("A Day in the Garden"), "a-day-in-the-garden");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  spaces   everywhere  "), "spaces-everywhere");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
