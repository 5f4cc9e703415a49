//! NFTune CLI - Command-line interface for playlist battles
//!
//! This binary provides commands for importing a song catalogue, running
//! battles, flipping cards and browsing the gallery, plus a WebSocket server
//! for game clients.

use clap::{Args, Parser, Subcommand};
use nftune_service::ActionKind;
use std::path::PathBuf;
use std::process::ExitCode;

use nftune_cli::app::AppOptions;
use nftune_cli::{commands, logging};

/// NFTune - Playlist Battle
#[derive(Parser)]
#[command(name = "nftune")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Store directory (default: $NFTUNE_STORE_DIR or the platform data dir)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Service config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output machine-readable JSON (no colored output)
    #[arg(long, global = true)]
    json: bool,

    /// Log service events at info level (overridden by NFTUNE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import songs and prompts from a catalogue JSON file
    Import {
        /// Path to the catalogue file
        file: String,
    },

    /// Start a new battle
    New {
        /// Player wallet address
        #[arg(short, long)]
        wallet: String,

        /// Prompt the playlist answers
        #[arg(short, long)]
        prompt: String,

        /// Candidate song (repeatable; default: the whole catalogue)
        #[arg(short, long = "song")]
        songs: Vec<String>,
    },

    /// Show a battle with its playlist and queue
    Show {
        /// Battle id
        battle: String,
    },

    /// List a wallet's battles
    Battles {
        /// Player wallet address
        #[arg(short, long)]
        wallet: String,
    },

    /// Move a song from the queue to the playlist (-5 energy)
    Add {
        /// Battle id
        battle: String,
        /// Song id
        song: String,
    },

    /// Drop a song from the queue (-3 energy)
    Pass {
        /// Battle id
        battle: String,
        /// Song id
        song: String,
    },

    /// Shuffle the playlist (+2 energy)
    Rearrange {
        /// Battle id
        battle: String,
    },

    /// Take a break (+5 energy)
    Pause {
        /// Battle id
        battle: String,
    },

    /// Flip cards to reveal queue songs
    Reveal {
        /// Battle id
        battle: String,

        /// Number of flips
        #[arg(short = 'n', long, default_value = "1")]
        flips: usize,

        /// Seed digits already used in earlier sessions
        #[arg(long, default_value = "0")]
        from: usize,
    },

    /// Submit a battle's playlist to the gallery
    Submit {
        /// Battle id
        battle: String,

        /// Playlist name
        #[arg(short, long)]
        name: String,

        /// Playlist description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Abandon a battle
    Abandon {
        /// Battle id
        battle: String,
    },

    /// Browse submitted playlists
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },

    /// Song catalogue commands
    Songs {
        #[command(subcommand)]
        command: SongCommands,
    },

    /// List playlist prompts
    Prompts,

    /// Show today's seed-driven playlists
    Daily {
        /// Hex seed (0x...); random when omitted
        #[arg(long)]
        seed: Option<String>,
    },

    /// Start the WebSocket battle server
    #[cfg(feature = "serve")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = commands::serve::DEFAULT_PORT)]
        port: u16,

        /// Keep records in memory only
        #[arg(long)]
        memory: bool,

        /// Catalogue file to import before serving
        #[arg(long)]
        catalog: Option<String>,
    },
}

#[derive(Subcommand)]
enum GalleryCommands {
    /// List entries grouped by prompt
    List {
        /// Only this wallet's entries
        #[arg(short, long)]
        wallet: Option<String>,
    },
    /// Show one entry with its songs
    Show {
        /// Entry id
        id: String,
    },
    /// Like an entry
    Like {
        /// Entry id
        id: String,
    },
    /// Count a play of an entry
    Play {
        /// Entry id
        id: String,
    },
}

#[derive(Subcommand)]
enum SongCommands {
    /// List the catalogue
    List,
    /// Like a song
    Like {
        /// Song id
        id: String,
    },
    /// Count a play of a song
    Play {
        /// Song id
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let GlobalArgs {
        store,
        config,
        json,
        verbose,
    } = cli.global;

    logging::init(verbose);
    if json {
        colored::control::set_override(false);
    }

    let mut app = AppOptions {
        store,
        config,
        memory: false,
    };

    let result = match cli.command {
        Commands::Import { file } => commands::catalog::import(&app, &file, json),
        Commands::New {
            wallet,
            prompt,
            songs,
        } => commands::battle::new(&app, &wallet, &prompt, &songs, json),
        Commands::Show { battle } => commands::battle::show(&app, &battle, json),
        Commands::Battles { wallet } => commands::battle::list(&app, &wallet, json),
        Commands::Add { battle, song } => {
            commands::action::run(&app, ActionKind::AddSong, &battle, Some(&song), json)
        }
        Commands::Pass { battle, song } => {
            commands::action::run(&app, ActionKind::PassSong, &battle, Some(&song), json)
        }
        Commands::Rearrange { battle } => {
            commands::action::run(&app, ActionKind::Rearrange, &battle, None, json)
        }
        Commands::Pause { battle } => {
            commands::action::run(&app, ActionKind::Pause, &battle, None, json)
        }
        Commands::Reveal {
            battle,
            flips,
            from,
        } => commands::reveal::run(&app, &battle, from, flips, json),
        Commands::Submit {
            battle,
            name,
            description,
        } => commands::gallery::submit(&app, &battle, &name, &description, json),
        Commands::Abandon { battle } => commands::battle::abandon(&app, &battle, json),
        Commands::Gallery { command } => match command {
            GalleryCommands::List { wallet } => {
                commands::gallery::list(&app, wallet.as_deref(), json)
            }
            GalleryCommands::Show { id } => commands::gallery::show(&app, &id, json),
            GalleryCommands::Like { id } => commands::gallery::like(&app, &id, json),
            GalleryCommands::Play { id } => commands::gallery::play(&app, &id, json),
        },
        Commands::Songs { command } => match command {
            SongCommands::List => commands::catalog::list_songs(&app, json),
            SongCommands::Like { id } => commands::catalog::like_song(&app, &id, json),
            SongCommands::Play { id } => commands::catalog::play_song(&app, &id, json),
        },
        Commands::Prompts => commands::catalog::list_prompts(&app, json),
        Commands::Daily { seed } => commands::daily::run(&app, seed.as_deref(), json),
        #[cfg(feature = "serve")]
        Commands::Serve {
            port,
            memory,
            catalog,
        } => {
            app.memory = memory;
            commands::serve::run(&app, port, catalog.as_deref())
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from(["nftune", "add", "btl-1", "s4", "--json"]).unwrap();
        assert!(cli.global.json);
        match cli.command {
            Commands::Add { battle, song } => {
                assert_eq!(battle, "btl-1");
                assert_eq!(song, "s4");
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_parses_new_with_songs() {
        let cli = Cli::try_parse_from([
            "nftune", "new", "-w", "0xabc", "-p", "p1", "-s", "s1", "--song", "s2",
        ])
        .unwrap();
        match cli.command {
            Commands::New {
                wallet,
                prompt,
                songs,
            } => {
                assert_eq!(wallet, "0xabc");
                assert_eq!(prompt, "p1");
                assert_eq!(songs, vec!["s1", "s2"]);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn test_cli_parses_reveal_defaults() {
        let cli = Cli::try_parse_from(["nftune", "--store", "/tmp/s", "reveal", "b1"]).unwrap();
        assert_eq!(cli.global.store, Some(PathBuf::from("/tmp/s")));
        match cli.command {
            Commands::Reveal {
                battle,
                flips,
                from,
            } => {
                assert_eq!(battle, "b1");
                assert_eq!(flips, 1);
                assert_eq!(from, 0);
            }
            _ => panic!("expected reveal command"),
        }
    }

    #[test]
    fn test_cli_parses_gallery_list() {
        let cli = Cli::try_parse_from(["nftune", "gallery", "list", "-w", "0xabc"]).unwrap();
        match cli.command {
            Commands::Gallery {
                command: GalleryCommands::List { wallet },
            } => assert_eq!(wallet.as_deref(), Some("0xabc")),
            _ => panic!("expected gallery list command"),
        }
    }

    #[test]
    fn test_add_requires_song() {
        assert!(Cli::try_parse_from(["nftune", "add", "btl-1"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
