//! `.editorconfig` lookup inside a commit's tree.

use git2::{ObjectType, Repository, Tree};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::git::glob::glob_match;
use crate::git::refs::resolve_ref;
use crate::git::repository::GitRepository;
use crate::models::EditorConfigResponse;

const FILE_NAME: &str = ".editorconfig";
const DEFAULT_TAB_WIDTH: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub glob: String,
    pub properties: BTreeMap<String, String>,
}

/// A parsed `.editorconfig` file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniFile {
    /// Keys before the first section header, e.g. `root = true`
    pub preamble: BTreeMap<String, String>,
    pub sections: Vec<Section>,
}

impl IniFile {
    pub fn parse(text: &str) -> Self {
        let mut file = IniFile::default();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                file.sections.push(Section {
                    glob: header.to_string(),
                    properties: BTreeMap::new(),
                });
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                tracing::debug!(line, "Skipping malformed editorconfig line");
                continue;
            };
            let key = line[..split].trim().to_lowercase();
            let value = line[split + 1..].trim().to_string();
            if key.is_empty() {
                continue;
            }

            let target = match file.sections.last_mut() {
                Some(section) => &mut section.properties,
                None => &mut file.preamble,
            };
            target.insert(key, value);
        }

        file
    }

    /// The last section whose glob matches `name`.
    pub fn matching_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().rev().find(|s| glob_match(&s.glob, name))
    }
}

/// Effective settings for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    properties: BTreeMap<String, String>,
}

impl EditorConfig {
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    fn number(&self, key: &str) -> Option<u32> {
        self.properties.get(key).and_then(|v| v.parse().ok())
    }

    /// `tab_width` (or its `tab_size` alias), else a numeric `indent_size`,
    /// else 8.
    pub fn tab_width(&self) -> u32 {
        self.number("tab_width")
            .or_else(|| self.number("tab_size"))
            .or_else(|| self.number("indent_size"))
            .unwrap_or(DEFAULT_TAB_WIDTH)
    }

    pub fn indent_style(&self) -> Option<&str> {
        self.properties.get("indent_style").map(|s| s.as_str())
    }

    /// `None` when unset or `off`.
    pub fn max_line_length(&self) -> Option<u32> {
        self.number("max_line_length")
    }
}

/// Tab width for an optional config.
pub fn tab_width(config: Option<&EditorConfig>) -> u32 {
    config.map_or(DEFAULT_TAB_WIDTH, EditorConfig::tab_width)
}

/// Trees from `root` down to the directory holding `path`, root first.
/// `None` if a directory on the way is missing or is not a tree.
fn directory_chain<'r>(repo: &'r Repository, root: &Tree<'r>, path: &str) -> Result<Option<Vec<Tree<'r>>>> {
    let dirs: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let dirs = match dirs.split_last() {
        Some((_, parents)) => parents,
        None => &[][..],
    };

    let mut chain = vec![root.clone()];
    for dir in dirs {
        let Some(current) = chain.last() else {
            return Ok(None);
        };
        let Some(entry) = current.get_name(dir) else {
            return Ok(None);
        };
        if entry.kind() != Some(ObjectType::Tree) {
            return Ok(None);
        }
        let id = entry.id();
        drop(entry);
        chain.push(repo.find_tree(id)?);
    }
    Ok(Some(chain))
}

fn read_config_file(repo: &Repository, tree: &Tree) -> Result<Option<IniFile>> {
    let Some(entry) = tree.get_name(FILE_NAME) else {
        return Ok(None);
    };
    if entry.kind() != Some(ObjectType::Blob) {
        return Ok(None);
    }
    let blob = repo.find_blob(entry.id())?;
    Ok(Some(IniFile::parse(&String::from_utf8_lossy(blob.content()))))
}

/// Resolve the settings that apply to `path` within `root`.
///
/// Files are consulted deepest first; the first file with a section
/// matching the file's basename decides, and within it the last matching
/// section wins.
pub fn resolve(repo: &Repository, root: &Tree, path: &str) -> Result<Option<EditorConfig>> {
    let Some(chain) = directory_chain(repo, root, path)? else {
        return Ok(None);
    };
    let name = path.rsplit('/').next().unwrap_or(path);

    for tree in chain.iter().rev() {
        let Some(file) = read_config_file(repo, tree)? else {
            continue;
        };
        if let Some(section) = file.matching_section(name) {
            tracing::debug!(path, section = %section.glob, "Matched editorconfig section");
            return Ok(Some(EditorConfig {
                properties: section.properties.clone(),
            }));
        }
    }

    Ok(None)
}

impl GitRepository {
    pub fn get_editorconfig(
        &self,
        ref_name: Option<&str>,
        path: Option<&str>,
    ) -> Result<EditorConfigResponse> {
        self.with_repo(|repo| {
            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            let root = resolved.commit.tree()?;
            let config = resolve(repo, &root, &resolved.path)?;

            Ok(EditorConfigResponse {
                ref_name: resolved.ref_name,
                path: resolved.path,
                matched: config.is_some(),
                tab_width: tab_width(config.as_ref()),
                indent_style: config
                    .as_ref()
                    .and_then(|c| c.indent_style())
                    .map(|s| s.to_string()),
                max_line_length: config.as_ref().and_then(|c| c.max_line_length()),
                properties: config.map(|c| c.properties).unwrap_or_default(),
            })
        })
    }
}
