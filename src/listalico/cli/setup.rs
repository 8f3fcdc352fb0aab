use clap::{ArgMatches, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// "0.1.0" for tagged release builds, "0.1.0@abc1234 2024-01-15 14:30" otherwise.
fn format_version(version: &str, hash: &str, commit_date: &str, is_release: bool) -> String {
    if is_release || hash.is_empty() {
        version.to_string()
    } else {
        format!("{}@{} {}", version, hash, commit_date)
    }
}

fn version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        format_version(
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH"),
            env!("GIT_COMMIT_DATE"),
            env!("IS_RELEASE") == "true",
        )
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "listalico",
    bin_name = "listalico",
    version = version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Notes and tasks in colored folders, from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (default: $LISTALICO_DATA or the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Headings of the grouped help screen and the commands under each, in order.
const HELP_GROUPS: &[(&str, &[&str])] = &[
    ("Notes:", &["create", "list", "search"]),
    (
        "Working with a note:",
        &["view", "edit", "done", "move", "delete", "restore"],
    ),
    ("Folders:", &["folder"]),
    ("Trash and backups:", &["purge", "export", "import"]),
    ("Other:", &["config", "help"]),
];

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let mut output = format!(
        "listalico {}\n{}\n\nUsage: listalico [OPTIONS] [COMMAND]\n",
        cmd.get_version().unwrap_or("unknown"),
        cmd.get_about().map(|s| s.to_string()).unwrap_or_default(),
    );

    for (heading, names) in HELP_GROUPS {
        output.push_str(&format!("\n{}\n", heading));
        for sub in names.iter().filter_map(|n| cmd.find_subcommand(n)) {
            let about = sub.get_about().map(|s| s.to_string()).unwrap_or_default();
            output.push_str(&format!("  {:<12} {}\n", sub.get_name(), about));
        }
    }

    output.push_str(concat!(
        "\nNotes are addressed by index: 1 2 3 (active), d1 d2 (trash), ranges like 2-4.\n",
        "Folders are addressed by position (1 2) or name; trashed folders by d1 d2.\n",
        "\nOptions:\n",
        "      --data-dir <DIR>  Data directory\n",
        "  -v, --verbose         Verbose output\n",
        "  -h, --help            Print help\n",
        "  -V, --version         Print version\n",
    ));
    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// The subcommand path the user typed, e.g. `["folder", "create"]`.
pub fn command_path(matches: &ArgMatches) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        path.push(name.to_string());
        current = sub;
    }
    path
}

fn find_command<'a>(cmd: &'a mut clap::Command, path: &[&str]) -> Option<&'a mut clap::Command> {
    match path.split_first() {
        None => Some(cmd),
        Some((first, rest)) => find_command(cmd.find_subcommand_mut(first)?, rest),
    }
}

/// Prints clap's help for a (possibly nested) subcommand, e.g. "folder create".
pub fn print_help_for_command(path: &str) {
    let mut cmd = Cli::command();
    let names: Vec<&str> = path.split_whitespace().collect();
    match find_command(&mut cmd, &names) {
        Some(target) => print!("{}", target.render_help()),
        None => {
            eprintln!("Unknown command: {}\n", path);
            print_grouped_help();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Note(NoteCommands),

    /// Manage folders
    #[command(subcommand, alias = "f", display_order = 20)]
    Folder(FolderCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Create a new note
    #[command(alias = "n", display_order = 1)]
    Create {
        /// Folder to file the note in (position or name)
        #[arg(short, long)]
        folder: Option<String>,

        /// Title words (joined with spaces; defaults to "Nueva Nota")
        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// List notes
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only notes in this folder (position or name)
        #[arg(short, long)]
        folder: Option<String>,

        /// Search term (title, content and categories)
        #[arg(short, long)]
        search: Option<String>,

        /// Show the trash instead
        #[arg(long, conflicts_with_all = ["folder", "search"])]
        trash: bool,
    },

    /// Search notes
    #[command(display_order = 3)]
    Search {
        /// Search words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// View one or more notes
    #[command(alias = "v", display_order = 10)]
    View {
        /// Indexes of the notes (e.g. 1 2-4 d1)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Change a note's fields
    #[command(alias = "e", display_order = 11)]
    Edit {
        /// Index of the note
        index: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New content
        #[arg(short, long)]
        content: Option<String>,

        /// Priority: high, medium or low
        #[arg(short, long)]
        priority: Option<String>,

        /// Turn the note into a task
        #[arg(long, conflicts_with = "no_task")]
        task: bool,

        /// Turn the task back into a plain note
        #[arg(long)]
        no_task: bool,

        /// Add a category (repeatable)
        #[arg(long = "tag", value_name = "CATEGORY")]
        tags: Vec<String>,

        /// Remove a category (repeatable)
        #[arg(long = "untag", value_name = "CATEGORY")]
        untags: Vec<String>,

        /// Move to this folder (position or name)
        #[arg(short, long, conflicts_with = "unfile")]
        folder: Option<String>,

        /// Take the note out of its folder
        #[arg(long)]
        unfile: bool,
    },

    /// Toggle tasks between done and open
    #[command(display_order = 12)]
    Done {
        /// Indexes of the notes (e.g. 1 3)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Move notes to another folder
    #[command(alias = "mv", display_order = 13)]
    Move {
        /// Indexes of the notes (e.g. 1 3)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,

        /// Target folder (position or name)
        #[arg(short, long, required_unless_present = "unfile", conflicts_with = "unfile")]
        to: Option<String>,

        /// Leave the notes without a folder
        #[arg(long)]
        unfile: bool,
    },

    /// Move notes to the trash
    #[command(alias = "rm", display_order = 14)]
    Delete {
        /// Indexes of the notes (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Bring notes back from the trash
    #[command(display_order = 15)]
    Restore {
        /// Trash indexes of the notes (e.g. d1 d2)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// List folders with their note counts
    #[command(alias = "ls")]
    List,

    /// Create a folder
    #[command(alias = "n")]
    Create {
        /// Color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,

        /// Name words (joined with spaces; defaults to "Nueva Carpeta")
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },

    /// Rename a folder
    Rename {
        /// Folder (position or name)
        folder: String,

        /// New name words
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Change a folder's color
    Color {
        /// Folder (position or name)
        folder: String,

        /// Color as #RRGGBB
        color: String,
    },

    /// Move a folder and all its notes to the trash
    #[command(alias = "rm")]
    Delete {
        /// Folder (position or name)
        folder: String,
    },

    /// Bring a folder and its notes back from the trash
    Restore {
        /// Trashed folder (d1, d2, ... or name)
        folder: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Permanently delete trashed items
    #[command(display_order = 30)]
    Purge {
        /// Trash indexes of notes (e.g. d1 d2); if omitted with no --folder, empties the trash
        #[arg(required = false, num_args = 0..)]
        indexes: Vec<String>,

        /// Trashed folder to purge (d1, d2, ... or name)
        #[arg(short, long)]
        folder: Option<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write a full JSON backup
    #[command(display_order = 31)]
    Export {
        /// Directory for the backup file (default: configured export_dir or .)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Replace all data with a JSON backup
    #[command(display_order = 32)]
    Import {
        /// Backup file to read
        file: PathBuf,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Get or set configuration
    #[command(display_order = 40)]
    Config {
        /// Configuration key (e.g. default_folder_color)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for listalico or a subcommand
    #[command(display_order = 41)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("listalico").chain(args.iter().copied()))
            .unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_joins_title_words() {
        let cli = parse(&["n", "-f", "Work", "buy", "milk"]);
        match cli.command {
            Some(Commands::Core(CoreCommands::Create { folder, title })) => {
                assert_eq!(folder.as_deref(), Some("Work"));
                assert_eq!(title, vec!["buy", "milk"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn edit_collects_repeated_tags() {
        let cli = parse(&["edit", "2", "--tag", "a", "--tag", "b", "--task", "-p", "high"]);
        match cli.command {
            Some(Commands::Note(NoteCommands::Edit {
                index,
                tags,
                task,
                priority,
                ..
            })) => {
                assert_eq!(index, "2");
                assert_eq!(tags, vec!["a", "b"]);
                assert!(task);
                assert_eq!(priority.as_deref(), Some("high"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn move_needs_a_target() {
        assert!(Cli::try_parse_from(["listalico", "move", "1"]).is_err());
        assert!(Cli::try_parse_from(["listalico", "move", "1", "--to", "2", "--unfile"]).is_err());
        parse(&["move", "1", "--unfile"]);
    }

    #[test]
    fn folder_subcommands() {
        let cli = parse(&["folder", "color", "Work", "#ff9500"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Folder(FolderCommands::Color { .. }))
        ));
    }

    #[test]
    fn global_data_dir_after_subcommand() {
        let cli = parse(&["ls", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn grouped_help_lists_every_visible_command() {
        let help = get_grouped_help();
        for (heading, _) in HELP_GROUPS {
            assert!(help.contains(heading));
        }
        let cmd = Cli::command();
        for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
            assert!(
                HELP_GROUPS.iter().any(|(_, names)| names.contains(&sub.get_name())),
                "{} is missing from the grouped help",
                sub.get_name()
            );
        }
    }

    #[test]
    fn command_path_follows_nested_subcommands() {
        let matches = Cli::command()
            .try_get_matches_from(["listalico", "folder", "create", "Work"])
            .unwrap();
        assert_eq!(command_path(&matches), vec!["folder", "create"]);
    }

    #[test]
    fn dev_versions_carry_the_commit() {
        assert_eq!(format_version("0.1.0", "abc1234", "2024-01-15 14:30", true), "0.1.0");
        assert_eq!(format_version("0.1.0", "", "", false), "0.1.0");
        assert_eq!(
            format_version("0.1.0", "abc1234", "2024-01-15 14:30", false),
            "0.1.0@abc1234 2024-01-15 14:30"
        );
    }
}
