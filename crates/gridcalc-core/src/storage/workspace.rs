//! Named workspaces in one XML save file.
//!
//! ```xml
//! <?xml version="1.0"?>
//! <data>
//!   <Budget>
//!     <cell row="1" column="1" expression="5"/>
//!   </Budget>
//! </data>
//! ```
//!
//! Each child of `<data>` is one workspace, named by its element name. Cells
//! are stored in the order they are replayed on load.

use std::path::{Path, PathBuf};

use gridcalc_engine::engine::CellEntry;
use log::warn;
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{GridcalcError, Result};

pub const DEFAULT_SAVE_FILE: &str = "save.xml";

const ROOT: &[u8] = b"data";
const CELL: &[u8] = b"cell";

/// Whether `name` can be used as a workspace (element) name.
pub fn is_valid_workspace_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.to_ascii_lowercase().starts_with("xml")
}

/// True if the file at `path` holds at least one workspace.
pub fn can_load(path: &Path) -> bool {
    WorkspaceFile::open(path).is_ok_and(|file| !file.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    pub cells: Vec<CellEntry>,
}

/// An XML save file, held in memory between [`WorkspaceFile::open`] and
/// [`WorkspaceFile::save`].
#[derive(Clone, Debug)]
pub struct WorkspaceFile {
    path: PathBuf,
    workspaces: Vec<Workspace>,
}

impl WorkspaceFile {
    /// Read a save file. A missing file opens as an empty one.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let workspaces = if path.exists() {
            parse_workspaces(&std::fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        Ok(WorkspaceFile { path, workspaces })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workspaces.iter().map(|w| w.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn workspace(&self, name: &str) -> Option<&[CellEntry]> {
        self.workspaces
            .iter()
            .find(|w| w.name == name)
            .map(|w| w.cells.as_slice())
    }

    /// Add a workspace, or replace the cells of an existing one in place.
    pub fn set_workspace(&mut self, name: &str, cells: Vec<CellEntry>) -> Result<()> {
        if !is_valid_workspace_name(name) {
            return Err(GridcalcError::InvalidWorkspaceName(name.to_string()));
        }
        match self.workspaces.iter_mut().find(|w| w.name == name) {
            Some(existing) => existing.cells = cells,
            None => self.workspaces.push(Workspace {
                name: name.to_string(),
                cells,
            }),
        }
        Ok(())
    }

    /// Remove a workspace. Returns false if there was none by that name.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.workspaces.len();
        self.workspaces.retain(|w| w.name != name);
        self.workspaces.len() != before
    }

    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.to_xml())?;
        Ok(())
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\"?>\n<data>\n");
        for workspace in &self.workspaces {
            if workspace.cells.is_empty() {
                out.push_str(&format!("  <{}/>\n", workspace.name));
                continue;
            }
            out.push_str(&format!("  <{}>\n", workspace.name));
            for cell in &workspace.cells {
                out.push_str(&format!(
                    "    <cell row=\"{}\" column=\"{}\" expression=\"{}\"/>\n",
                    cell.row,
                    cell.column,
                    escape(cell.formula.as_str())
                ));
            }
            out.push_str(&format!("  </{}>\n", workspace.name));
        }
        out.push_str("</data>\n");
        out
    }
}

/// 1-based line of a byte offset, for error messages.
fn line_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Parse the contents of a save file.
///
/// Structural problems (malformed XML, a root other than `<data>`) are
/// errors. `cell` elements with missing or unreadable attributes are skipped
/// with a warning.
pub fn parse_workspaces(text: &str) -> Result<Vec<Workspace>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut workspaces: Vec<Workspace> = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position() as usize;
        let parse_error = |message: String| GridcalcError::Parse {
            line: line_at(text, position),
            message,
        };

        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                match depth {
                    0 => open_root(e, &mut seen_root).map_err(parse_error)?,
                    1 => workspaces.push(new_workspace(e)),
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => match depth {
                0 => open_root(e, &mut seen_root).map_err(parse_error)?,
                1 => workspaces.push(new_workspace(e)),
                2 if e.name().as_ref() == CELL => {
                    if let (Some(workspace), Some(cell)) =
                        (workspaces.last_mut(), read_cell(e, line_at(text, position)))
                    {
                        workspace.cells.push(cell);
                    }
                }
                _ => {}
            },
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(workspaces)
}

fn open_root(e: &BytesStart<'_>, seen_root: &mut bool) -> std::result::Result<(), String> {
    if e.name().as_ref() != ROOT {
        return Err(format!(
            "expected <data> root element, found <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        ));
    }
    if *seen_root {
        return Err("more than one <data> root element".to_string());
    }
    *seen_root = true;
    Ok(())
}

fn new_workspace(e: &BytesStart<'_>) -> Workspace {
    Workspace {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        cells: Vec::new(),
    }
}

fn read_cell(e: &BytesStart<'_>, line: usize) -> Option<CellEntry> {
    let mut row = None;
    let mut column = None;
    let mut formula = None;

    for attr in e.attributes().flatten() {
        let raw = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"row" => row = raw.trim().parse::<usize>().ok(),
            b"column" => column = raw.trim().parse::<usize>().ok(),
            b"expression" => formula = unescape(&raw).ok().map(|s| s.into_owned()),
            _ => {}
        }
    }

    match (row, column, formula) {
        (Some(row), Some(column), Some(formula)) => Some(CellEntry {
            row,
            column,
            formula,
        }),
        _ => {
            warn!("line {}: skipping <cell> without valid row, column and expression", line);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(row: usize, column: usize, formula: &str) -> CellEntry {
        CellEntry {
            row,
            column,
            formula: formula.to_string(),
        }
    }

    #[test]
    fn test_workspace_names() {
        assert!(is_valid_workspace_name("Budget"));
        assert!(is_valid_workspace_name("_q3.draft-2"));
        assert!(!is_valid_workspace_name(""));
        assert!(!is_valid_workspace_name("2024"));
        assert!(!is_valid_workspace_name("my budget"));
        assert!(!is_valid_workspace_name("<x>"));
        assert!(!is_valid_workspace_name("XmlStuff"));
    }

    #[test]
    fn test_parse_save_file() {
        let text = r#"<?xml version="1.0"?>
<data>
  <Budget>
    <cell row="1" column="1" expression="5"/>
    <cell row="2" column="1" expression="A1 2 &lt; 1 +"/>
  </Budget>
  <Empty/>
</data>
"#;
        let workspaces = parse_workspaces(text).unwrap();
        assert_eq!(workspaces.len(), 2);
        assert_eq!(workspaces[0].name, "Budget");
        assert_eq!(
            workspaces[0].cells,
            vec![entry(1, 1, "5"), entry(2, 1, "A1 2 < 1 +")]
        );
        assert_eq!(workspaces[1].name, "Empty");
        assert!(workspaces[1].cells.is_empty());
    }

    #[test]
    fn test_bad_cell_attributes_are_skipped() {
        let text = r#"<data><W>
            <cell row="x" column="1" expression="5"/>
            <cell column="1" expression="5"/>
            <cell row="1" column="2" expression="7"/>
        </W></data>"#;
        let workspaces = parse_workspaces(text).unwrap();
        assert_eq!(workspaces[0].cells, vec![entry(1, 2, "7")]);
    }

    #[test]
    fn test_wrong_root_is_a_parse_error() {
        let err = parse_workspaces("<sheet><W/></sheet>").unwrap_err();
        assert!(matches!(err, GridcalcError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_workspaces("<data><W></data>").is_err());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SAVE_FILE);
        assert!(!can_load(&path));

        let mut file = WorkspaceFile::open(&path).unwrap();
        assert!(file.is_empty());
        file.set_workspace("Budget", vec![entry(1, 1, "5"), entry(1, 2, "A1 \"x\" &")])
            .unwrap();
        file.set_workspace("Other", vec![]).unwrap();
        file.save().unwrap();
        assert!(can_load(&path));

        let mut reopened = WorkspaceFile::open(&path).unwrap();
        assert_eq!(reopened.names().collect::<Vec<_>>(), vec!["Budget", "Other"]);
        assert_eq!(
            reopened.workspace("Budget").unwrap(),
            &[entry(1, 1, "5"), entry(1, 2, "A1 \"x\" &")]
        );

        reopened.set_workspace("Budget", vec![entry(3, 3, "1")]).unwrap();
        assert!(reopened.remove("Other"));
        assert!(!reopened.remove("Other"));
        assert_eq!(reopened.names().collect::<Vec<_>>(), vec!["Budget"]);
        assert_eq!(reopened.workspace("Budget").unwrap(), &[entry(3, 3, "1")]);
    }

    proptest::proptest! {
        #[test]
        fn prop_expression_text_survives_escaping(formula in "[ -~]{0,24}") {
            let mut file = WorkspaceFile::open("unused.xml").unwrap();
            file.set_workspace("W", vec![entry(1, 1, &formula)]).unwrap();
            let parsed = parse_workspaces(&file.to_xml()).unwrap();
            proptest::prop_assert_eq!(&parsed[0].cells[0].formula, &formula);
        }
    }

    #[test]
    fn test_to_xml_layout() {
        let mut file = WorkspaceFile::open("unused.xml").unwrap();
        file.set_workspace("Budget", vec![entry(1, 2, "A1 1 <")]).unwrap();
        file.set_workspace("Empty", vec![]).unwrap();
        assert_eq!(
            file.to_xml(),
            "<?xml version=\"1.0\"?>\n<data>\n  <Budget>\n    \
             <cell row=\"1\" column=\"2\" expression=\"A1 1 &lt;\"/>\n  \
             </Budget>\n  <Empty/>\n</data>\n"
        );
    }

    #[test]
    fn test_set_workspace_rejects_bad_names() {
        let mut file = WorkspaceFile::open("/nonexistent/save.xml").unwrap();
        assert!(matches!(
            file.set_workspace("two words", vec![]),
            Err(GridcalcError::InvalidWorkspaceName(_))
        ));
        assert!(file.is_empty());
    }
}
