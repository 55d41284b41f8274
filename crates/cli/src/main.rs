//! `smotree` -- review comments on a video timeline and export them as
//! NLE markers.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default               | Description                     |
//! |-------------------------|----------|-----------------------|---------------------------------|
//! | `DATABASE_URL`          | no       | `sqlite://smotree.db` | SQLite database file            |
//! | `SMOTREE_EXPORT_DIR`    | no       | `.`                   | Where `export` writes files     |
//! | `SMOTREE_MARKER_PREFIX` | no       | `SmoTree`             | Marker name / title prefix      |
//! | `SMOTREE_USER_NAME`     | no       | --                    | Default author for new comments |
//! | `RUST_LOG`              | no       | `smotree_cli=info,smotree_db=info` | Log filter         |

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use smotree_cli::config::CliConfig;
use smotree_cli::service::{PlaybackPosition, ReviewService};
use smotree_cli::sink::FileSink;
use smotree_core::export::{ExportFormat, ExportOptions};
use smotree_core::format::{format_duration, format_file_size};
use smotree_core::framerate::{normalize_framerate, parse_framerate};
use smotree_core::review::Comment;
use smotree_core::status::CommentStatus;
use smotree_core::timecode::{
    frame_to_seconds, seconds_to_frame, timecode_to_frame, timecode_to_seconds, Timecode,
};
use smotree_core::types::DbId;
use smotree_db::models::project::{CreateProject, UpdateProject};
use smotree_db::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "smotree", version, about = "Frame-accurate video review comments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage review projects.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage timestamped comments.
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Export a project's comments as NLE markers.
    Export(ExportArgs),
    /// Convert between seconds and timecode.
    Timecode(TimecodeArgs),
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    Create {
        #[arg(long)]
        name: String,
        /// Decimal (29.97) or rational (30000/1001).
        #[arg(long, value_parser = parse_rate)]
        framerate: f64,
        /// Video length in seconds.
        #[arg(long)]
        duration: f64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        video_filename: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        /// Snap a measured framerate to the nearest common rate.
        #[arg(long)]
        normalize: bool,
    },
    List,
    Show {
        id: DbId,
    },
    /// Change project fields. The framerate is locked once comments exist.
    Update {
        id: DbId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_rate)]
        framerate: Option<f64>,
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        video_filename: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
    },
    Delete {
        id: DbId,
    },
}

#[derive(Debug, Subcommand)]
enum CommentCommand {
    Add {
        project_id: DbId,
        /// Seconds (65.04) or timecode (00:01:05:01).
        #[arg(long)]
        at: PlaybackPosition,
        #[arg(long)]
        text: String,
        #[arg(long)]
        author: Option<String>,
        /// Reply to this comment.
        #[arg(long)]
        parent: Option<DbId>,
    },
    /// Replies are indented under the comment they answer.
    List {
        project_id: DbId,
    },
    /// Replace a comment's text.
    Edit {
        comment_id: DbId,
        #[arg(long)]
        text: String,
    },
    Status {
        comment_id: DbId,
        /// unresolved, in_progress, resolved (open = unresolved).
        status: CommentStatus,
    },
    Delete {
        comment_id: DbId,
    },
}

#[derive(Debug, Args)]
struct ExportArgs {
    project_id: DbId,
    #[arg(long, default_value = "xml")]
    format: ExportFormat,
    /// Leave resolved comments out of the XML markers.
    #[arg(long)]
    exclude_resolved: bool,
    /// Omit the per-marker metadata block.
    #[arg(long)]
    no_metadata: bool,
    /// Overrides `SMOTREE_EXPORT_DIR`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TimecodeArgs {
    /// Seconds (65.04) or timecode (00:01:05:01).
    value: PlaybackPosition,
    #[arg(long, value_parser = parse_rate)]
    framerate: f64,
}

fn parse_rate(text: &str) -> Result<f64, String> {
    parse_framerate(text).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smotree_cli=info,smotree_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    // Pure conversion needs no database.
    if let Command::Timecode(args) = &cli.command {
        return convert_timecode(args);
    }

    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let service = ReviewService::new(store);

    match cli.command {
        Command::Project(cmd) => run_project(&service, &config, cmd).await,
        Command::Comment(cmd) => run_comment(&service, &config, cmd).await,
        Command::Export(args) => run_export(&service, &config, args).await,
        Command::Timecode(_) => Ok(()),
    }
}

async fn run_project(
    service: &ReviewService<SqliteStore>,
    config: &CliConfig,
    cmd: ProjectCommand,
) -> anyhow::Result<()> {
    match cmd {
        ProjectCommand::Create {
            name,
            framerate,
            duration,
            description,
            video_filename,
            video_url,
            normalize,
        } => {
            let framerate = if normalize {
                normalize_framerate(framerate)
            } else {
                framerate
            };
            let project = service
                .create_project(CreateProject {
                    name,
                    description,
                    framerate,
                    duration,
                    video_filename,
                    video_url,
                    created_by: config.user_name.clone(),
                })
                .await?;
            println!("Created project {} ({})", project.id, project.name);
        }
        ProjectCommand::List => {
            for p in service.list_projects().await? {
                println!(
                    "{}\t{}\t{} fps\t{}",
                    p.id,
                    p.name,
                    p.framerate,
                    format_duration(p.duration)
                );
            }
        }
        ProjectCommand::Show { id } => {
            let project = service.project(id).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectCommand::Update {
            id,
            name,
            framerate,
            duration,
            description,
            video_filename,
            video_url,
        } => {
            let update = UpdateProject {
                name,
                description,
                framerate,
                duration,
                video_filename,
                video_url,
            };
            let project = service.update_project(id, update).await?;
            println!("Updated project {} ({})", project.id, project.name);
        }
        ProjectCommand::Delete { id } => {
            service.delete_project(id).await?;
            println!("Deleted project {id}");
        }
    }
    Ok(())
}

async fn run_comment(
    service: &ReviewService<SqliteStore>,
    config: &CliConfig,
    cmd: CommentCommand,
) -> anyhow::Result<()> {
    match cmd {
        CommentCommand::Add {
            project_id,
            at,
            text,
            author,
            parent,
        } => {
            let author = config.author(author);
            let comment = service
                .add_comment_at(project_id, &at, &author, &text, parent)
                .await
                .with_context(|| format!("Failed to add comment at {at}"))?;
            println!("Added comment {} at {}", comment.id, comment.timecode);
        }
        CommentCommand::List { project_id } => {
            for (depth, comment) in service.list_comment_threads(project_id).await? {
                println!("{}", comment_line(depth, &comment));
            }
        }
        CommentCommand::Edit { comment_id, text } => {
            let comment = service.edit_comment(comment_id, &text).await?;
            println!("Edited comment {}", comment.id);
        }
        CommentCommand::Status { comment_id, status } => {
            let comment = service.set_status(comment_id, status).await?;
            println!("Comment {} is now {}", comment.id, comment.status);
        }
        CommentCommand::Delete { comment_id } => {
            service.delete_comment(comment_id).await?;
            println!("Deleted comment {comment_id}");
        }
    }
    Ok(())
}

fn comment_line(depth: usize, comment: &Comment) -> String {
    let indent = "  ".repeat(depth);
    format!(
        "{indent}{}\t{}\t{}\t{}: {}",
        comment.id, comment.timecode, comment.status, comment.author, comment.text
    )
}

async fn run_export(
    service: &ReviewService<SqliteStore>,
    config: &CliConfig,
    args: ExportArgs,
) -> anyhow::Result<()> {
    let options = ExportOptions {
        include_resolved: !args.exclude_resolved,
        include_metadata: !args.no_metadata,
        marker_prefix: config.marker_prefix.clone(),
        ..ExportOptions::default()
    };
    let today = chrono::Local::now().date_naive();

    let artifact = service
        .export(args.project_id, args.format, &options, today)
        .await?;

    let sink = FileSink::new(args.out_dir.unwrap_or_else(|| config.export_dir.clone()));
    let path = sink
        .write(&artifact)
        .await
        .with_context(|| format!("Failed to write export into {}", sink.dir().display()))?;
    println!(
        "{} ({})",
        path.display(),
        format_file_size(artifact.content.len() as u64)
    );
    Ok(())
}

fn convert_timecode(args: &TimecodeArgs) -> anyhow::Result<()> {
    match &args.value {
        PlaybackPosition::Seconds(seconds) => {
            let frame = seconds_to_frame(*seconds, args.framerate)?;
            let timecode = Timecode::from_frame(frame, args.framerate)?;
            println!("{timecode}\tframe {frame}");
        }
        PlaybackPosition::Timecode(tc) => {
            let frame = timecode_to_frame(tc, args.framerate)?;
            let seconds = timecode_to_seconds(tc, args.framerate)?;
            let wall_clock = frame_to_seconds(frame, args.framerate)?;
            println!("frame {frame}\t{seconds:.3}s timecode\t{wall_clock:.3}s wall clock");
        }
    }
    Ok(())
}
