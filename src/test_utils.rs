use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::engine::{Colorspace, OpenedDocument, PageGeometry, Raster, RenderEngine};
use crate::error::EngineFault;

/// In-memory engine with scripted documents and failures
#[derive(Default)]
pub struct FakeEngine {
    documents: RefCell<HashMap<String, Vec<PageGeometry>>>,
    failing_pages: RefCell<HashSet<(String, usize)>>,
    display_list_calls: Cell<usize>,
    open_documents: Cell<usize>,
}

pub struct FakeDocument {
    path: String,
    pages: Vec<PageGeometry>,
}

pub struct FakeDisplayList {
    pub page: usize,
    pub geometry: PageGeometry,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` openable with the given page sizes
    pub fn add_document(&self, path: &str, pages: Vec<PageGeometry>) {
        self.documents.borrow_mut().insert(path.to_string(), pages);
    }

    /// Make building the display list of `page` (0-based) in `path` fail
    pub fn fail_page(&self, path: &str, page: usize) {
        self.failing_pages
            .borrow_mut()
            .insert((path.to_string(), page));
    }

    pub fn display_list_calls(&self) -> usize {
        self.display_list_calls.get()
    }

    /// Documents opened and not yet closed
    pub fn open_documents(&self) -> usize {
        self.open_documents.get()
    }
}

impl RenderEngine for FakeEngine {
    type Document = FakeDocument;
    type DisplayList = FakeDisplayList;

    fn open(&self, path: &Path) -> Result<OpenedDocument<FakeDocument>, EngineFault> {
        let key = path.to_string_lossy().into_owned();
        let pages = self
            .documents
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| EngineFault::generic(format!("no such document: {key}")))?;

        self.open_documents.set(self.open_documents.get() + 1);
        Ok(OpenedDocument {
            page_count: pages.len(),
            document: FakeDocument { path: key, pages },
        })
    }

    fn page_geometry(&self, document: &FakeDocument, page: usize) -> Result<PageGeometry, EngineFault> {
        document
            .pages
            .get(page)
            .copied()
            .ok_or_else(|| EngineFault::generic(format!("page {page} out of range")))
    }

    fn display_list(&self, document: &FakeDocument, page: usize) -> Result<FakeDisplayList, EngineFault> {
        self.display_list_calls.set(self.display_list_calls.get() + 1);
        if self
            .failing_pages
            .borrow()
            .contains(&(document.path.clone(), page))
        {
            return Err(EngineFault::generic("damaged page"));
        }
        Ok(FakeDisplayList {
            page,
            geometry: self.page_geometry(document, page)?,
        })
    }

    fn rasterize(
        &self,
        list: &FakeDisplayList,
        scale: f32,
        colorspace: Colorspace,
    ) -> Result<Raster, EngineFault> {
        let width = (list.geometry.width * scale).round().max(1.0) as u32;
        let height = (list.geometry.height * scale).round().max(1.0) as u32;
        let len = width as usize * height as usize * colorspace.channels();
        Ok(Raster {
            pixels: vec![255; len],
            width,
            height,
            colorspace,
        })
    }

    fn close(&self, document: FakeDocument) {
        drop(document);
        self.open_documents
            .set(self.open_documents.get().saturating_sub(1));
    }
}

pub mod test_helpers {
    use crate::event_source::{
        Event, KeyCode, MouseEventKind, SimulatedEventSource,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        /// Type every character of `text`
        pub fn type_text(mut self, text: &str) -> Self {
            self.events
                .extend(text.chars().map(SimulatedEventSource::char_key));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        pub fn press_tab(self) -> Self {
            self.press_key(KeyCode::Tab)
        }

        pub fn next_page(self) -> Self {
            self.press_key(KeyCode::Right)
        }

        pub fn previous_page(self) -> Self {
            self.press_key(KeyCode::Left)
        }

        /// Mouse wheel towards the end of the document
        pub fn wheel_down(mut self) -> Self {
            self.events
                .push(SimulatedEventSource::mouse(MouseEventKind::ScrollDown));
            self
        }

        pub fn wheel_up(mut self) -> Self {
            self.events
                .push(SimulatedEventSource::mouse(MouseEventKind::ScrollUp));
            self
        }

        pub fn resize(mut self, columns: u16, rows: u16) -> Self {
            self.events.push(Event::Resize(columns, rows));
            self
        }

        /// Close the active view (press 'q')
        pub fn close_view(self) -> Self {
            self.press_char('q')
        }

        /// Close every view and exit (Esc)
        pub fn quit_all(self) -> Self {
            self.press_esc()
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn scenario_builder_collects_events() {
        let scenario = TestScenarioBuilder::new()
            .press_char('o')
            .type_text("a.pdf")
            .press_enter()
            .wheel_down()
            .resize(80, 24)
            .quit_all()
            .build();

        assert_eq!(scenario.events.len(), 10);
    }

    #[test]
    fn fake_engine_tracks_open_documents() {
        let engine = FakeEngine::new();
        engine.add_document("a.pdf", vec![PageGeometry::new(10.0, 20.0)]);

        let opened = engine.open(Path::new("a.pdf")).unwrap();
        assert_eq!(opened.page_count, 1);
        assert_eq!(engine.open_documents(), 1);
        assert!(engine.open(Path::new("b.pdf")).is_err());

        let list = engine.display_list(&opened.document, 0).unwrap();
        let raster = engine.rasterize(&list, 0.5, Colorspace::Gray).unwrap();
        assert_eq!((raster.width, raster.height), (5, 10));

        engine.close(opened.document);
        assert_eq!(engine.open_documents(), 0);
    }
}
