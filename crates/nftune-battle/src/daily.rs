//! Seed-driven daily playlists for the home page.
//!
//! The catalogue is shuffled with a generator seeded from the first eight hex
//! digits of the daily seed and sliced into six fixed templates of five songs.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::records::Song;
use crate::rng::{create_rng, shuffled};
use crate::seed::RandomSeed;

/// Songs per daily playlist.
pub const SONGS_PER_DAILY_PLAYLIST: usize = 5;

struct Template {
    name: &'static str,
    description: &'static str,
    color: &'static str,
}

const TEMPLATES: [Template; 6] = [
    Template {
        name: "Daily Mix",
        description: "Fresh picks for today",
        color: "from-purple-900 to-blue-500",
    },
    Template {
        name: "Chill Vibes",
        description: "Perfect for relaxing",
        color: "from-green-900 to-emerald-500",
    },
    Template {
        name: "Energy Boost",
        description: "Get motivated",
        color: "from-orange-900 to-red-500",
    },
    Template {
        name: "Focus Flow",
        description: "Concentrate and create",
        color: "from-blue-900 to-cyan-500",
    },
    Template {
        name: "Community Picks",
        description: "Trending in the community",
        color: "from-pink-900 to-rose-500",
    },
    Template {
        name: "Discover Weekly",
        description: "New finds just for you",
        color: "from-yellow-900 to-amber-500",
    },
];

/// One generated playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlaylist {
    /// 1-based position.
    pub id: u32,
    /// Template name.
    pub name: String,
    /// Template description.
    pub description: String,
    /// Color gradient.
    pub color: String,
    /// Up to five songs.
    pub songs: Vec<Song>,
}

impl DailyPlaylist {
    /// Number of songs.
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }
}

/// Builds the six daily playlists for `seed`.
///
/// An all-zero seed means the source has no seed yet; callers should use
/// [`generate_daily_playlists_with_rng`] then.
pub fn generate_daily_playlists(seed: &RandomSeed, catalog: &[Song]) -> Vec<DailyPlaylist> {
    let mut rng = create_rng(seed.leading_u32() as u64);
    generate_daily_playlists_with_rng(catalog, &mut rng)
}

/// Builds the six daily playlists using an arbitrary generator.
pub fn generate_daily_playlists_with_rng<R: Rng + ?Sized>(
    catalog: &[Song],
    rng: &mut R,
) -> Vec<DailyPlaylist> {
    if catalog.is_empty() {
        return fallback_playlists();
    }

    let order = shuffled(catalog, rng);
    let mut chunks = order.chunks(SONGS_PER_DAILY_PLAYLIST);
    TEMPLATES
        .iter()
        .zip(1u32..)
        .map(|(template, id)| {
            let songs = chunks.next().map(<[Song]>::to_vec).unwrap_or_default();
            playlist(id, template, songs)
        })
        .collect()
}

/// The six templates with no songs.
pub fn fallback_playlists() -> Vec<DailyPlaylist> {
    TEMPLATES
        .iter()
        .zip(1u32..)
        .map(|(template, id)| playlist(id, template, Vec::new()))
        .collect()
}

fn playlist(id: u32, template: &Template, songs: Vec<Song>) -> DailyPlaylist {
    DailyPlaylist {
        id,
        name: template.name.to_string(),
        description: template.description.to_string(),
        color: template.color.to_string(),
        songs,
    }
}
