//! Terminal front end
//!
//! Draws the exercise as ASCII tablature, one block per measure, and
//! reads answers line by line from stdin. Every character typed counts
//! as a keystroke, so `EbG` answers three items at once.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::DrillConfig;
use crate::driver::{InputSource, ItemMark, Renderer};
use crate::exercise::Exercise;
use crate::fretboard::NoteToken;
use crate::session::SessionSummary;

const CELL_WIDTH: usize = 5;

#[derive(Debug, Clone)]
struct Cell {
    group: usize,
    sub: usize,
    string: u8,
    fret: u8,
    mark: Option<ItemMark>,
    flash: Option<NoteToken>,
}

impl Cell {
    fn text(&self) -> String {
        if let Some(token) = &self.flash {
            return token.to_string();
        }
        match self.mark {
            None => self.fret.to_string(),
            Some(ItemMark::Current) => format!("[{}]", self.fret),
            Some(ItemMark::Correct) => format!("{}✓", self.fret),
            Some(ItemMark::Incorrect) => format!("{}✗", self.fret),
        }
    }
}

/// Tablature renderer over any writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    string_labels: Vec<String>,
    group_size: usize,
    cells: Vec<Cell>,
    dirty: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, config: &DrillConfig) -> Self {
        Self {
            out,
            string_labels: config.tuning.clone(),
            group_size: config.group_size,
            cells: Vec::new(),
            dirty: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn group_count(&self) -> usize {
        self.cells.iter().map(|c| c.group + 1).max().unwrap_or(0)
    }

    /// Tablature for the current exercise, one line per string
    pub fn render_grid(&self) -> String {
        let label_width = self.string_labels.iter().map(|l| l.len()).max().unwrap_or(1);
        let mut grid = String::new();

        for (string, label) in self.string_labels.iter().enumerate() {
            grid.push_str(&format!("{:>width$} ", label, width = label_width));
            for group in 0..self.group_count() {
                grid.push('|');
                for sub in 0..self.group_size {
                    let cell = self
                        .cells
                        .iter()
                        .find(|c| c.group == group && c.sub == sub && c.string as usize == string);
                    let text = cell.map(Cell::text).unwrap_or_default();
                    grid.push_str(&format!("{:-^width$}", text, width = CELL_WIDTH));
                }
            }
            grid.push_str("|\n");
        }
        grid
    }

    fn prompt(&self) -> Option<String> {
        self.cells
            .iter()
            .find(|c| c.mark == Some(ItemMark::Current))
            .map(|c| {
                let label = self
                    .string_labels
                    .get(c.string as usize)
                    .map(String::as_str)
                    .unwrap_or("?");
                format!(
                    "Name the note at fret {} on the {} string (A-G natural, a-g flat):",
                    c.fret, label
                )
            })
    }

    fn cell_mut(&mut self, handle: usize) -> Result<&mut Cell> {
        self.cells
            .get_mut(handle)
            .ok_or_else(|| anyhow::anyhow!("Unknown cell handle {}", handle))
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    type Handle = usize;

    fn render_exercise(&mut self, exercise: &mut Exercise<usize>) -> Result<()> {
        self.cells.clear();
        for (index, item) in exercise.items_mut().iter_mut().enumerate() {
            self.cells.push(Cell {
                group: item.group_index,
                sub: item.sub_index,
                string: item.position.string,
                fret: item.position.fret,
                mark: None,
                flash: None,
            });
            item.handle = Some(index);
        }
        self.dirty = true;
        Ok(())
    }

    fn mark(&mut self, handle: &usize, mark: ItemMark) -> Result<()> {
        self.cell_mut(*handle)?.mark = Some(mark);
        self.dirty = true;
        Ok(())
    }

    fn flash(&mut self, handle: &usize, token: &NoteToken) -> Result<()> {
        self.cell_mut(*handle)?.flash = Some(token.clone());
        self.dirty = true;
        Ok(())
    }

    fn clear_flash(&mut self, handle: &usize) -> Result<()> {
        self.cell_mut(*handle)?.flash = None;
        self.dirty = true;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let grid = self.render_grid();
        writeln!(self.out)?;
        write!(self.out, "{}", grid)?;
        if let Some(prompt) = self.prompt() {
            writeln!(self.out, "{}", prompt)?;
        }
        self.out.flush()?;
        self.dirty = false;
        Ok(())
    }

    fn finish(&mut self, summary: &SessionSummary) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Session Summary")?;
        writeln!(self.out, "===============")?;
        writeln!(self.out, "Exercises completed: {}", summary.exercises_completed)?;
        writeln!(self.out, "Answers: {}", summary.answers)?;
        writeln!(
            self.out,
            "Recent accuracy: {:.0}% ({}/{})",
            summary.ledger.accuracy * 100.0,
            summary.ledger.correct,
            summary.ledger.total
        )?;
        if !summary.hardest.is_empty() {
            writeln!(self.out, "Hardest positions:")?;
            for report in &summary.hardest {
                writeln!(
                    self.out,
                    "  string {} fret {} ({}): difficulty {:.2}, {}/{} correct",
                    report.position.string,
                    report.position.fret,
                    report.note,
                    report.difficulty,
                    report.correct,
                    report.attempts
                )?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Lines buffered between the reader thread and the driver
const INPUT_BUFFER: usize = 16;

/// Line-oriented stdin reader
///
/// Lines are read on a plain OS thread and forwarded over a channel. A read
/// that is still blocked when the drill ends does not hold up process exit.
pub struct StdinInput {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    /// Forward lines from any blocking reader
    pub fn from_reader<B: BufRead + Send + 'static>(reader: B) -> Self {
        let (tx, rx) = mpsc::channel(INPUT_BUFFER);
        thread::spawn(move || {
            for line in reader.lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("Input reader finished");
        });
        Self { lines: rx }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinInput {
    async fn next_input(&mut self) -> Result<Option<String>> {
        match self.lines.recv().await {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn renderer_with_exercise() -> (TerminalRenderer<Vec<u8>>, Session<usize>) {
        let config = DrillConfig::default();
        let mut session: Session<usize> = Session::with_seed(&config, 21).unwrap();
        let mut renderer = TerminalRenderer::new(Vec::new(), &config);
        renderer.render_exercise(session.exercise_mut()).unwrap();
        (renderer, session)
    }

    #[test]
    fn test_attaches_handles() {
        let (_, session) = renderer_with_exercise();
        for (i, item) in session.exercise().items().iter().enumerate() {
            assert_eq!(item.handle, Some(i));
        }
    }

    #[test]
    fn test_grid_layout() {
        let (renderer, session) = renderer_with_exercise();
        let grid = renderer.render_grid();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 6);
        for line in &lines {
            // label, space, then two measures of four cells
            assert_eq!(line.chars().count(), 2 + 2 * (1 + 4 * CELL_WIDTH) + 1);
        }

        let first = &session.exercise().items()[0];
        let row = lines[first.position.string as usize];
        assert!(row.contains(&first.position.fret.to_string()));
    }

    #[test]
    fn test_marks_and_flash_show_in_grid() {
        let (mut renderer, _) = renderer_with_exercise();
        renderer.mark(&0, ItemMark::Current).unwrap();
        assert!(renderer.render_grid().contains('['));

        renderer.mark(&0, ItemMark::Incorrect).unwrap();
        renderer.flash(&0, &NoteToken::new("g")).unwrap();
        let flashed = renderer.render_grid();
        assert!(flashed.contains("--g--"));
        assert!(!flashed.contains('✗'));

        renderer.clear_flash(&0).unwrap();
        assert!(renderer.render_grid().contains('✗'));
    }

    #[test]
    fn test_refresh_writes_prompt() {
        let (mut renderer, _) = renderer_with_exercise();
        renderer.mark(&0, ItemMark::Current).unwrap();
        renderer.refresh().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("Name the note at fret"));
    }

    #[test]
    fn test_unknown_handle_is_error() {
        let (mut renderer, _) = renderer_with_exercise();
        assert!(renderer.mark(&99, ItemMark::Correct).is_err());
    }

    #[tokio::test]
    async fn test_reader_lines_forwarded_until_eof() {
        let mut input = StdinInput::from_reader(io::Cursor::new("Eb G\n\nC\n"));
        assert_eq!(input.next_input().await.unwrap().as_deref(), Some("Eb G"));
        assert_eq!(input.next_input().await.unwrap().as_deref(), Some(""));
        assert_eq!(input.next_input().await.unwrap().as_deref(), Some("C"));
        assert_eq!(input.next_input().await.unwrap(), None);
    }
}
