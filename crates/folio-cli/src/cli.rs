use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Manage portfolio content from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage case-study projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage the career timeline
    Experience {
        #[command(subcommand)]
        command: ExperienceCommands,
    },
    /// Manage the client roster
    Clients {
        #[command(subcommand)]
        command: ClientCommands,
    },
    /// Show or edit the profile overview
    #[command(alias = "profile")]
    Overview {
        #[command(subcommand)]
        command: OverviewCommands,
    },
    /// Show or edit security settings
    Security {
        #[command(subcommand)]
        command: SecurityCommands,
    },
    /// Show record counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export every collection as JSON
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects in display order
    List {
        /// Case-insensitive title filter
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a project at the end of the grid
    #[command(alias = "new")]
    Add {
        /// Project title
        title: String,
        /// Display category
        #[arg(long)]
        category: Option<String>,
        /// Filter bucket (coding, graphic, motion, photo-video)
        #[arg(long)]
        filter: Option<String>,
        /// Short description
        #[arg(long)]
        description: Option<String>,
        /// Feature the project on the landing page
        #[arg(long)]
        featured: bool,
        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Edit fields of a project
    Edit {
        /// Project id
        id: String,
        /// Field assignment as path=json (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,
        /// Tag to add (repeatable)
        #[arg(long, value_name = "TAG")]
        add_tag: Vec<String>,
        /// Tag to remove (repeatable)
        #[arg(long, value_name = "TAG")]
        remove_tag: Vec<String>,
        /// Palette color to add, as hex (repeatable)
        #[arg(long, value_name = "HEX")]
        add_color: Vec<String>,
    },
    /// Move a project to a new grid position
    Move {
        /// Project id
        id: String,
        /// Zero-based target position
        #[arg(long)]
        to: usize,
    },
    /// Upload a media file into a project's gallery
    Upload {
        /// Project id
        id: String,
        /// File to upload
        file: PathBuf,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete a project
    Delete {
        /// Project id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ExperienceCommands {
    /// List timeline entries, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a timeline entry
    #[command(alias = "new")]
    Add {
        /// Role or degree
        role: String,
        /// Company or school
        company: String,
        /// Period label, e.g. "2021 - Present"
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Record as education instead of work
        #[arg(long)]
        education: bool,
    },
    /// Edit fields of a timeline entry
    Edit {
        id: String,
        /// Field assignment as path=json (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,
    },
    /// Delete a timeline entry
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// List clients, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a client
    #[command(alias = "new")]
    Add {
        /// Client name
        name: String,
        /// Role played for the client
        #[arg(long)]
        role: Option<String>,
        /// Partnership year
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit fields of a client
    Edit {
        id: String,
        /// Field assignment as path=json (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,
    },
    /// Delete a client
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum OverviewCommands {
    /// Print the profile overview
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit profile fields
    Set {
        /// Field assignment as path=json (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Append a headline stat
    AddStat { label: String, value: String },
    /// Remove a headline stat by position
    RemoveStat { index: usize },
}

#[derive(Subcommand)]
pub enum SecurityCommands {
    /// Print security settings
    Show,
    /// Update security settings
    Set {
        #[arg(long)]
        allow_sign_up: Option<bool>,
        #[arg(long)]
        maintenance_mode: Option<bool>,
        /// Deploy webhook url (empty to clear)
        #[arg(long)]
        webhook_url: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
