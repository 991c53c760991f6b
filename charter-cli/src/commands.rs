//! Subcommands and their execution.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Subcommand;

use competency::CompetencyAreaCode;
use evidence::hub::ALLOWED_FILE_TYPES;
use evidence::{CharterWorkspace, HubUpload, ProfileData, Submission};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with a mock account (starts from empty evidence)
    Login {
        email: String,
    },

    /// Sign out and delete all stored data
    Logout,

    /// Show or update the profile
    Profile {
        /// Career summary
        #[arg(long)]
        summary: Option<String>,
        /// Target professional engineering institution
        #[arg(long)]
        pei: Option<String>,
    },

    /// List competency areas and sub-competencies
    Catalog,

    /// Submit narrative evidence for a sub-competency
    AddText {
        code: String,
        text: String,
    },

    /// Submit a document as evidence for a sub-competency
    AddFile {
        code: String,
        path: PathBuf,
    },

    /// List evidence, optionally for one sub-competency
    List {
        code: Option<String>,
    },

    /// Delete one evidence item
    Remove {
        code: String,
        id: String,
    },

    /// Progress per area, readiness and next steps
    Dashboard,

    /// Draft one area's report section from Green and Amber evidence
    DraftSection {
        #[arg(value_parser = parse_area)]
        area: CompetencyAreaCode,
    },

    /// Draft one area's full narrative
    DraftArea {
        #[arg(value_parser = parse_area)]
        area: CompetencyAreaCode,
    },

    /// Draft the full application (requires readiness)
    DraftAll {
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Plain text instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// File evidence hub
    #[command(subcommand)]
    Hub(HubCommands),
}

#[derive(Debug, Subcommand)]
pub enum HubCommands {
    /// Upload a file, optionally tagged with hub competencies
    Add {
        path: PathBuf,
        /// Hub competency ids (poc-1 .. poc-5)
        #[arg(short, long)]
        tag: Vec<String>,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },

    /// List uploaded files
    List,

    /// Delete a file
    Delete {
        id: String,
    },

    /// Replace a file's tags
    Tag {
        id: String,
        tags: Vec<String>,
    },

    /// Status of each hub competency
    Status,
}

fn parse_area(value: &str) -> Result<CompetencyAreaCode, String> {
    CompetencyAreaCode::parse(value).ok_or_else(|| format!("unknown area '{}' (expected A-E)", value))
}

/// MIME type for a hub upload, from its extension.
fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = format!(".{}", path.extension()?.to_str()?.to_lowercase());
    ALLOWED_FILE_TYPES
        .iter()
        .find(|(_, exts)| exts.split(", ").any(|e| e == ext))
        .map(|(mime, _)| *mime)
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
        .with_context(|| format!("not a file path: {}", path.display()))
}

fn describe_submission(submission: &Submission) -> String {
    let item = &submission.item;
    let mut out = format!(
        "Stored {} for {}: {}\n",
        item.id, item.sub_competency_code, item.rag_status
    );
    if let Some(feedback) = &item.ai_feedback {
        let _ = writeln!(out, "Feedback: {}", feedback);
    }
    if !submission.outcome.is_confident() {
        let _ = writeln!(out, "(status inferred from an irregular reply)");
    }
    out
}

/// Run one command and return what to print.
pub async fn execute(workspace: &CharterWorkspace, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Login { email } => {
            let user = workspace.login(&email).await?;
            Ok(format!("Signed in as {} ({})", user.display_name(), user.email))
        }

        Commands::Logout => {
            workspace.logout().await?;
            Ok("Signed out; stored data removed".to_string())
        }

        Commands::Profile { summary, pei } => {
            let mut profile: ProfileData = workspace.profile().await;
            if summary.is_some() || pei.is_some() {
                if let Some(summary) = summary {
                    profile.career_summary = summary;
                }
                if let Some(pei) = pei {
                    profile.target_pei = pei;
                }
                workspace.update_profile(profile.clone()).await?;
            }
            Ok(serde_json::to_string_pretty(&profile)?)
        }

        Commands::Catalog => {
            let catalog = workspace.catalog();
            let mut out = String::new();
            for area in catalog.areas() {
                let _ = writeln!(out, "{}: {}", area.code, area.title);
                for sub in catalog.in_area(area.code) {
                    let _ = writeln!(out, "  {}  {}", sub.code, sub.title);
                }
            }
            Ok(out)
        }

        Commands::AddText { code, text } => {
            let submission = workspace.submit_text_evidence(&code, &text).await?;
            Ok(describe_submission(&submission))
        }

        Commands::AddFile { code, path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = file_name(&path)?;
            let submission = workspace.submit_file_evidence(&code, &name, &bytes).await?;
            Ok(describe_submission(&submission))
        }

        Commands::List { code } => {
            let snapshot = workspace.snapshot().await;
            let mut out = String::new();
            for sub in workspace.catalog().sub_competencies() {
                if code.as_deref().is_some_and(|c| c != sub.code) {
                    continue;
                }
                for item in snapshot.items_for(&sub.code) {
                    let label = item.original_file_name.as_deref().unwrap_or("text");
                    let _ = writeln!(
                        out,
                        "{}  {}  {:<11} {}",
                        sub.code, item.id, item.rag_status.as_str(), label
                    );
                }
            }
            if out.is_empty() {
                out.push_str("No evidence yet\n");
            }
            Ok(out)
        }

        Commands::Remove { code, id } => match workspace.remove_evidence(&code, &id).await? {
            Some(item) => Ok(format!("Removed {}", item.id)),
            None => bail!("no evidence {} under {}", id, code),
        },

        Commands::Dashboard => {
            let summary = workspace.dashboard().await;
            let mut out = String::new();
            for area in &summary.areas {
                let _ = writeln!(
                    out,
                    "{} {:<60} G{} A{} R{} -{} /{}",
                    area.area_code,
                    area.title,
                    area.green_count,
                    area.amber_count,
                    area.red_count,
                    area.not_assessed_count,
                    area.total_sub_competencies
                );
            }
            let counts = &summary.counts;
            let _ = writeln!(
                out,
                "\nItems: {} green, {} amber, {} red, {} awaiting assessment",
                counts.green_items, counts.amber_items, counts.red_items, counts.awaiting_assessment
            );
            let ready = summary.readiness.is_ready_to_generate_full_application;
            let _ = writeln!(out, "Ready for full application: {}", if ready { "yes" } else { "no" });
            let _ = writeln!(out, "\nNext steps:");
            for step in summary.surfaced_steps() {
                let _ = writeln!(out, "  - {}", step);
            }
            Ok(out)
        }

        Commands::DraftSection { area } => Ok(workspace.draft_section(area).await.html()),

        Commands::DraftArea { area } => match workspace.draft_area(area).await {
            Some(outcome) => Ok(outcome.html()),
            None => bail!("area {} is not in the catalog", area),
        },

        Commands::DraftAll { output, text } => {
            let draft = match workspace.draft_full_application().await {
                Ok(draft) => draft,
                Err(evidence::EvidenceError::NotReady { .. }) => {
                    let readiness = workspace.readiness().await;
                    let mut message =
                        "You are not quite ready to generate the full application. Please ensure:\n"
                            .to_string();
                    for reason in readiness.not_ready_reasons(workspace.catalog().len()) {
                        let _ = writeln!(message, "- {}", reason);
                    }
                    bail!(message)
                }
                Err(e) => return Err(e.into()),
            };

            let rendered = if text {
                draft.to_text()
            } else {
                draft.to_html()
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    Ok(format!("Wrote {}", path.display()))
                }
                None => Ok(rendered),
            }
        }

        Commands::Hub(command) => execute_hub(workspace, command).await,
    }
}

async fn execute_hub(workspace: &CharterWorkspace, command: HubCommands) -> anyhow::Result<String> {
    let hub = workspace.hub();
    match command {
        HubCommands::Add { path, tag, mime } => {
            let mime_type = match mime {
                Some(mime) => mime,
                None => guess_mime(&path)
                    .with_context(|| format!("cannot tell the type of {}; pass --mime", path.display()))?
                    .to_string(),
            };
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let file = hub
                .add_file(HubUpload {
                    file_name: file_name(&path)?,
                    mime_type,
                    bytes,
                    competency_ids: tag,
                })
                .await?;
            Ok(format!("Added {} ({} bytes)", file.id, file.file_size))
        }

        HubCommands::List => {
            let mut out = String::new();
            for file in hub.list_files().await {
                let _ = writeln!(
                    out,
                    "{}  {}  {}  [{}]",
                    file.id,
                    file.file_name,
                    file.upload_date.format("%Y-%m-%d"),
                    file.associated_competency_ids.join(", ")
                );
            }
            if out.is_empty() {
                out.push_str("No files uploaded\n");
            }
            Ok(out)
        }

        HubCommands::Delete { id } => match hub.delete_file(&id).await? {
            Some(file) => Ok(format!("Deleted {}", file.file_name)),
            None => bail!("no hub file {}", id),
        },

        HubCommands::Tag { id, tags } => {
            let file = hub.update_associations(&id, tags).await?;
            Ok(format!(
                "{} tagged [{}]",
                file.file_name,
                file.associated_competency_ids.join(", ")
            ))
        }

        HubCommands::Status => {
            let mut out = String::new();
            for row in hub.status_table().await {
                let _ = writeln!(
                    out,
                    "{}  {:<45} {:?} ({} files)",
                    row.competency.id, row.competency.title, row.status, row.file_count
                );
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_area() {
        assert_eq!(parse_area("c"), Ok(CompetencyAreaCode::C));
        assert!(parse_area("F").is_err());
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("photo.JPEG")), Some("image/jpeg"));
        assert_eq!(
            guess_mime(Path::new("cv.docx")),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
        assert_eq!(guess_mime(Path::new("notes.txt")), None);
        assert_eq!(guess_mime(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_dashboard_lists_surfaced_steps() {
        use std::sync::Arc;

        use charter_agent::MockBackend;
        use evidence::MemoryStore;

        let workspace = CharterWorkspace::open(
            Arc::new(MemoryStore::new()),
            Arc::new(MockBackend::default()),
        )
        .await
        .unwrap();
        workspace.login("sam@example.com").await.unwrap();

        let output = execute(&workspace, Commands::Dashboard).await.unwrap();
        let listed: Vec<&str> = output
            .lines()
            .filter_map(|line| line.strip_prefix("  - "))
            .collect();

        let summary = workspace.dashboard().await;
        assert!(!listed.is_empty());
        assert_eq!(listed, summary.surfaced_steps());
    }
}
