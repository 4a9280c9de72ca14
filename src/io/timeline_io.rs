use std::collections::HashSet;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tempfile::NamedTempFile;

use crate::io::name_codec::{self, NameCodecError};
use crate::model::archetype::TrackArchetype;
use crate::model::config::LayoutConfig;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::names;
use crate::ops::track_ops::{self, LoadedTrack, TrackError};

pub const MAGIC: &[u8; 4] = b"TLN1";
pub const VERSION: u32 = 1;

const FLAG_MUTED: u8 = 1 << 0;
const FLAG_LOOPED: u8 = 1 << 1;
const FLAG_EXPANDED: u8 = 1 << 2;

/// Error type for timeline file I/O
#[derive(Debug, thiserror::Error)]
pub enum TimelineIoError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("not a timeline file")]
    BadMagic,
    #[error("unsupported timeline version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid frame rate {0}")]
    BadFps(f32),
    #[error("unknown track archetype tag {0}")]
    UnknownArchetype(u8),
    #[error("track {index} has parent {parent}, which is not an earlier track")]
    BadParent { index: u32, parent: i32 },
    #[error("duplicate track name {0:?}")]
    DuplicateName(String),
    #[error("invalid track name {0:?}")]
    InvalidName(String),
    #[error("name error: {0}")]
    Name(#[from] NameCodecError),
    #[error("corrupt timeline: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Track(#[from] TrackError),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize the whole tree, tracks in pre-order so parents precede children
pub fn write_timeline<W: Write>(writer: &mut W, tl: &Timeline) -> Result<(), TimelineIoError> {
    let order = tl.document_order();
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_f32::<LittleEndian>(tl.fps())?;
    writer.write_u32::<LittleEndian>(tl.current_frame())?;
    writer.write_u32::<LittleEndian>(order.len() as u32)?;

    for &id in &order {
        let Some(track) = tl.track(id) else {
            continue;
        };
        let mut flags = 0u8;
        if track.muted {
            flags |= FLAG_MUTED;
        }
        if track.looped {
            flags |= FLAG_LOOPED;
        }
        if track.is_expanded() {
            flags |= FLAG_EXPANDED;
        }
        let parent_pos = track
            .parent()
            .and_then(|p| order.iter().position(|&o| o == p))
            .map_or(-1, |pos| pos as i32);

        writer.write_u8(track.archetype.tag())?;
        writer.write_u8(flags)?;
        writer.write_i32::<LittleEndian>(parent_pos)?;
        name_codec::write_name(writer, &track.name)?;
        match &track.title {
            Some(title) => {
                writer.write_u8(1)?;
                name_codec::write_name(writer, title)?;
            }
            None => writer.write_u8(0)?,
        }
        let media: Vec<_> = track.media().iter().filter_map(|m| tl.media(*m)).collect();
        writer.write_u32::<LittleEndian>(media.len() as u32)?;
        for m in media {
            writer.write_u32::<LittleEndian>(m.start_frame)?;
            writer.write_u32::<LittleEndian>(m.duration_frames)?;
        }
    }
    Ok(())
}

pub fn encode_timeline(tl: &Timeline) -> Result<Vec<u8>, TimelineIoError> {
    let mut out = Vec::new();
    write_timeline(&mut out, tl)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Read a timeline written by [`write_timeline`]. The result is not marked
/// edited and has an empty event queue.
pub fn read_timeline<R: Read>(
    reader: &mut R,
    layout: LayoutConfig,
) -> Result<Timeline, TimelineIoError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(TimelineIoError::BadMagic);
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(TimelineIoError::UnsupportedVersion(version));
    }
    let fps = reader.read_f32::<LittleEndian>()?;
    if !(fps.is_finite() && fps > 0.0) {
        return Err(TimelineIoError::BadFps(fps));
    }
    let current_frame = reader.read_u32::<LittleEndian>()?;
    let count = reader.read_u32::<LittleEndian>()?;

    let mut tl = Timeline::new(fps, layout);
    tl.set_current_frame(current_frame);
    tl.with_layout_suspended(|tl| {
        let mut ids: Vec<TrackId> = Vec::new();
        let mut names: HashSet<String> = HashSet::new();
        for index in 0..count {
            let loaded = read_track(reader, index, &ids)?;
            if !names.insert(loaded.name.clone()) {
                return Err(TimelineIoError::DuplicateName(loaded.name));
            }
            ids.push(track_ops::insert_loaded_track(tl, loaded)?);
        }
        Ok(())
    })?;
    tl.clear_edited();
    tl.drain_events();
    tracing::debug!(tracks = tl.track_count(), fps, "timeline decoded");
    Ok(tl)
}

fn read_track<R: Read>(
    reader: &mut R,
    index: u32,
    ids: &[TrackId],
) -> Result<LoadedTrack, TimelineIoError> {
    let tag = reader.read_u8()?;
    let archetype = TrackArchetype::from_tag(tag).ok_or(TimelineIoError::UnknownArchetype(tag))?;
    let flags = reader.read_u8()?;
    let parent_pos = reader.read_i32::<LittleEndian>()?;
    let parent = match parent_pos {
        -1 => None,
        p if p >= 0 && (p as usize) < ids.len() => Some(ids[p as usize]),
        p => {
            return Err(TimelineIoError::BadParent { index, parent: p });
        }
    };
    let name = name_codec::read_name(reader)?;
    // Drag payloads split on ';', so stored names must already be clean
    if names::sanitize(&name, archetype) != name {
        return Err(TimelineIoError::InvalidName(name));
    }
    let title = match reader.read_u8()? {
        0 => None,
        _ => Some(name_codec::read_name(reader)?),
    };
    let media_count = reader.read_u32::<LittleEndian>()?;
    let mut media = Vec::new();
    for _ in 0..media_count {
        let start = reader.read_u32::<LittleEndian>()?;
        let duration = reader.read_u32::<LittleEndian>()?;
        media.push((start, duration));
    }
    Ok(LoadedTrack {
        archetype,
        name,
        title,
        muted: flags & FLAG_MUTED != 0,
        looped: flags & FLAG_LOOPED != 0,
        expanded: flags & FLAG_EXPANDED != 0,
        parent,
        media,
    })
}

pub fn decode_timeline(bytes: &[u8], layout: LayoutConfig) -> Result<Timeline, TimelineIoError> {
    read_timeline(&mut Cursor::new(bytes), layout)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn load(path: &Path, layout: LayoutConfig) -> Result<Timeline, TimelineIoError> {
    let bytes = fs::read(path).map_err(|e| TimelineIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tl = decode_timeline(&bytes, layout)?;
    tracing::info!(path = %path.display(), tracks = tl.track_count(), "loaded timeline");
    Ok(tl)
}

/// Write the timeline atomically and clear its edited flag
pub fn save(path: &Path, tl: &mut Timeline) -> Result<(), TimelineIoError> {
    let bytes = encode_timeline(tl)?;
    atomic_write(path, &bytes).map_err(|e| TimelineIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tl.clear_edited();
    tracing::info!(path = %path.display(), tracks = tl.track_count(), "saved timeline");
    Ok(())
}

/// Write via a temp file in the same directory, then rename over `path`
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
