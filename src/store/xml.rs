//! XML configuration document store
//!
//! Aliases live at `<root>/aliases/alias`. Reading goes through serde; writing
//! streams the original document and replaces only the `address` and
//! `detail` fields of each alias plus the top-level `revision` element, so
//! everything else round-trips untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::alias::{reserved_names, Alias, AliasTable};
use crate::errors::{AliasToolError, Result};

use super::backup::backup_document;
use super::ConfigStore;

/// Username recorded in the revision element
const REVISION_USER: &str = "(system)";

#[derive(Debug, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    aliases: Option<AliasesRecord>,
    #[serde(default)]
    revision: Option<RevisionRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct AliasesRecord {
    #[serde(default)]
    alias: Vec<AliasRecord>,
}

#[derive(Debug, Deserialize)]
struct AliasRecord {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    alias_type: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    descr: String,
}

#[derive(Debug, Default, Deserialize)]
struct RevisionRecord {
    #[serde(default)]
    time: Option<String>,
}

impl From<AliasRecord> for Alias {
    fn from(record: AliasRecord) -> Self {
        Alias {
            name: record.name,
            alias_type: record.alias_type,
            address: record.address,
            detail: record.detail,
            descr: record.descr,
        }
    }
}

/// Where and how many document backups to keep
#[derive(Debug, Clone)]
pub struct BackupPolicy {
    pub dir: PathBuf,
    pub keep: usize,
}

/// Store backed by the appliance XML configuration document
#[derive(Debug)]
pub struct XmlConfigStore {
    path: PathBuf,
    document: String,
    reserved: Vec<String>,
    backups: Option<BackupPolicy>,
}

impl XmlConfigStore {
    /// Read the document at `path`. `extra_reserved` is added to the built-in
    /// reserved table names.
    pub fn open(path: impl Into<PathBuf>, extra_reserved: &[String]) -> Result<Self> {
        let path = path.into();
        let document = fs::read_to_string(&path).map_err(|e| {
            AliasToolError::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = document.len(), "Config document loaded");

        Ok(Self {
            path,
            document,
            reserved: reserved_names(extra_reserved),
            backups: None,
        })
    }

    /// Keep up to `keep` copies of the previous document in `dir`
    pub fn with_backups(mut self, dir: impl Into<PathBuf>, keep: usize) -> Self {
        self.backups = Some(BackupPolicy { dir: dir.into(), keep });
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document as last read or written
    pub fn document(&self) -> &str {
        &self.document
    }

    fn parse(&self) -> Result<DocumentRecord> {
        Ok(quick_xml::de::from_str(&self.document)?)
    }

    fn persist(&self, content: &[u8]) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let permissions = fs::metadata(&self.path).map(|m| m.permissions()).ok();

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| AliasToolError::Store(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(content)
            .map_err(|e| AliasToolError::Store(format!("Failed to write config: {}", e)))?;
        if let Some(permissions) = permissions {
            temp.as_file().set_permissions(permissions)?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| AliasToolError::Store(format!("Failed to sync config: {}", e)))?;
        temp.persist(&self.path)
            .map_err(|e| AliasToolError::Store(format!("Failed to save config: {}", e.error)))?;
        Ok(())
    }
}

impl ConfigStore for XmlConfigStore {
    fn read_aliases(&self) -> Result<Option<AliasTable>> {
        let record = self.parse()?;
        Ok(record.aliases.map(|section| {
            AliasTable::new(section.alias.into_iter().map(Alias::from).collect())
        }))
    }

    fn reserved_names(&self) -> &[String] {
        &self.reserved
    }

    fn write_aliases(&mut self, table: &AliasTable, description: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let previous_time = self
            .parse()?
            .revision
            .and_then(|r| r.time)
            .and_then(|t| t.trim().parse::<i64>().ok());

        let revision = Revision {
            time: now,
            description,
            username: REVISION_USER,
        };
        let content = rewrite_document(&self.document, table.as_slice(), &revision)?;
        let content = String::from_utf8(content)
            .map_err(|e| AliasToolError::Store(format!("Rewritten config is not UTF-8: {}", e)))?;

        if let Some(policy) = &self.backups {
            backup_document(&self.path, &policy.dir, previous_time.unwrap_or(now), policy.keep)?;
        }

        self.persist(content.as_bytes())?;
        self.document = content;
        info!(path = %self.path.display(), description, "Config written");
        Ok(())
    }
}

/// Values for the top-level revision element
struct Revision<'a> {
    time: i64,
    description: &'a str,
    username: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Aliases,
    Alias,
    Address,
    Detail,
    Revision,
    Time,
    Description,
    Username,
    Other,
}

impl Tag {
    fn of(name: &[u8]) -> Self {
        match name {
            b"aliases" => Tag::Aliases,
            b"alias" => Tag::Alias,
            b"address" => Tag::Address,
            b"detail" => Tag::Detail,
            b"revision" => Tag::Revision,
            b"time" => Tag::Time,
            b"description" => Tag::Description,
            b"username" => Tag::Username,
            _ => Tag::Other,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Tag::Aliases => "aliases",
            Tag::Alias => "alias",
            Tag::Address => "address",
            Tag::Detail => "detail",
            Tag::Revision => "revision",
            Tag::Time => "time",
            Tag::Description => "description",
            Tag::Username => "username",
            Tag::Other => "",
        }
    }
}

/// Stream `document`, replacing the alias fields with those of `aliases`
/// (matched by position) and the revision element with `revision`.
fn rewrite_document(document: &str, aliases: &[Alias], revision: &Revision<'_>) -> Result<Vec<u8>> {
    let mut rewriter = Rewriter {
        writer: Writer::new(Vec::with_capacity(document.len() + 256)),
        aliases,
        revision,
        depth: 0,
        in_aliases: false,
        in_revision: false,
        current: None,
        next_alias: 0,
        written: Vec::new(),
        revision_written: false,
    };
    rewriter.run(document)?;

    if rewriter.next_alias != aliases.len() {
        return Err(AliasToolError::Store(format!(
            "Alias table has {} entries but the document has {}",
            aliases.len(),
            rewriter.next_alias
        )));
    }
    Ok(rewriter.writer.into_inner())
}

struct Rewriter<'t> {
    writer: Writer<Vec<u8>>,
    aliases: &'t [Alias],
    revision: &'t Revision<'t>,
    /// Open elements before the current event
    depth: usize,
    in_aliases: bool,
    in_revision: bool,
    /// Position of the alias element currently open
    current: Option<usize>,
    next_alias: usize,
    /// Fields already emitted inside the current alias or revision element
    written: Vec<Tag>,
    revision_written: bool,
}

impl Rewriter<'_> {
    fn run(&mut self, document: &str) -> Result<()> {
        let mut reader = Reader::from_str(document);
        // Depth at which a replaced element's original content ends
        let mut skip_to: Option<usize> = None;

        loop {
            let event = reader.read_event()?;

            if let Some(target) = skip_to {
                match event {
                    Event::Start(_) => self.depth += 1,
                    Event::End(e) => {
                        self.depth -= 1;
                        if self.depth == target {
                            self.writer.write_event(Event::End(e))?;
                            skip_to = None;
                        }
                    }
                    Event::Eof => {
                        return Err(AliasToolError::Store("Unexpected end of config document".into()))
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(e) => {
                    let tag = Tag::of(e.name().into_inner());
                    self.enter(tag);
                    let replacement = self.replacement(tag);

                    self.writer.write_event(Event::Start(e))?;
                    self.depth += 1;

                    if let Some(value) = replacement {
                        self.write_content(tag, &value)?;
                        self.written.push(tag);
                        skip_to = Some(self.depth - 1);
                    }
                }
                Event::Empty(e) => {
                    let tag = Tag::of(e.name().into_inner());
                    if self.depth == 2 && self.in_aliases && tag == Tag::Alias {
                        self.next_alias += 1;
                        self.writer.write_event(Event::Empty(e))?;
                    } else if self.depth == 1 && tag == Tag::Revision {
                        self.write_revision()?;
                        self.revision_written = true;
                    } else if let Some(value) = self.replacement(tag) {
                        self.write_field(tag, &value)?;
                        self.written.push(tag);
                    } else {
                        self.writer.write_event(Event::Empty(e))?;
                    }
                }
                Event::End(e) => {
                    self.leave()?;
                    self.writer.write_event(Event::End(e))?;
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof => break,
                other => self.writer.write_event(other)?,
            }
        }
        Ok(())
    }

    fn enter(&mut self, tag: Tag) {
        match (self.depth, tag) {
            (1, Tag::Aliases) => self.in_aliases = true,
            (2, Tag::Alias) if self.in_aliases => {
                self.current = Some(self.next_alias);
                self.next_alias += 1;
                self.written.clear();
            }
            (1, Tag::Revision) => {
                self.in_revision = true;
                self.revision_written = true;
                self.written.clear();
            }
            _ => {}
        }
    }

    /// Called before writing an end tag that closes an element at `self.depth`
    fn leave(&mut self) -> Result<()> {
        match self.depth {
            3 if self.current.is_some() => {
                for tag in [Tag::Address, Tag::Detail] {
                    if self.written.contains(&tag) {
                        continue;
                    }
                    if let Some(value) = self.replacement_at(tag, 3).filter(|v| !v.is_empty()) {
                        self.write_field(tag, &value)?;
                    }
                }
                self.current = None;
            }
            2 if self.in_revision => {
                for tag in [Tag::Time, Tag::Description, Tag::Username] {
                    if !self.written.contains(&tag) {
                        if let Some(value) = self.replacement_at(tag, 2) {
                            self.write_field(tag, &value)?;
                        }
                    }
                }
                self.in_revision = false;
            }
            2 if self.in_aliases => self.in_aliases = false,
            1 if !self.revision_written => {
                self.write_revision()?;
                self.revision_written = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn replacement(&self, tag: Tag) -> Option<String> {
        self.replacement_at(tag, self.depth)
    }

    /// New text for a field element opened at `depth`, if it is one we own
    fn replacement_at(&self, tag: Tag, depth: usize) -> Option<String> {
        if depth == 3 {
            let alias = self.current.and_then(|i| self.aliases.get(i))?;
            return match tag {
                Tag::Address => Some(alias.address.clone()),
                Tag::Detail => Some(alias.detail.clone()),
                _ => None,
            };
        }
        if depth == 2 && self.in_revision {
            return match tag {
                Tag::Time => Some(self.revision.time.to_string()),
                Tag::Description => Some(self.revision.description.to_string()),
                Tag::Username => Some(self.revision.username.to_string()),
                _ => None,
            };
        }
        None
    }

    fn write_content(&mut self, tag: Tag, value: &str) -> Result<()> {
        let as_cdata = matches!(tag, Tag::Detail | Tag::Description)
            && !value.is_empty()
            && !value.contains("]]>");
        if as_cdata {
            self.writer.write_event(Event::CData(BytesCData::new(value)))?;
        } else if !value.is_empty() {
            self.writer.write_event(Event::Text(BytesText::new(value)))?;
        }
        Ok(())
    }

    fn write_field(&mut self, tag: Tag, value: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(tag.as_str())))?;
        self.write_content(tag, value)?;
        self.writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        Ok(())
    }

    fn write_revision(&mut self) -> Result<()> {
        let time = self.revision.time.to_string();
        let description = self.revision.description;
        let username = self.revision.username;

        self.writer.write_event(Event::Start(BytesStart::new("revision")))?;
        self.write_field(Tag::Time, &time)?;
        self.write_field(Tag::Description, description)?;
        self.write_field(Tag::Username, username)?;
        self.writer.write_event(Event::End(BytesEnd::new("revision")))?;
        Ok(())
    }
}
