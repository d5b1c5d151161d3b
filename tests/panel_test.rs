// Panel exclusivity and the orthogonal pinyin flag.

use std::collections::HashMap;

use reader_wasm::panels::{PanelController, PanelId};
use reader_wasm::pipeline::{DefinitionEntry, WordSegment};
use reader_wasm::surface::UiSurface;

/// Tracks the visibility each panel was last set to.
#[derive(Default)]
struct VisibilitySurface {
    panels: HashMap<&'static str, bool>,
    pinyin: Option<bool>,
}

impl VisibilitySurface {
    fn visible_panels(&self) -> Vec<&'static str> {
        let mut visible: Vec<_> = self
            .panels
            .iter()
            .filter(|(_, v)| **v)
            .map(|(name, _)| *name)
            .collect();
        visible.sort();
        visible
    }
}

impl UiSurface for VisibilitySurface {
    fn input_bytes(&mut self) -> Vec<u8> {
        Vec::new()
    }
    fn append_output(&mut self, _text: &str) {}
    fn clear_output(&mut self) {}
    fn push_segment(&mut self, _segment: &WordSegment) {}
    fn clear_segments(&mut self) {}
    fn push_definition(&mut self, _entry: &DefinitionEntry) {}
    fn clear_definitions(&mut self) {}

    fn set_panel_visible(&mut self, panel: PanelId, visible: bool) {
        self.panels.insert(panel.name(), visible);
    }

    fn set_pinyin_visible(&mut self, visible: bool) {
        self.pinyin = Some(visible);
    }
}

#[test]
fn initial_state_shows_the_license_panel_with_pinyin_hidden() {
    let mut surface = VisibilitySurface::default();
    let panels = PanelController::new();
    panels.sync(&mut surface);

    assert_eq!(panels.selected(), PanelId::License);
    assert_eq!(surface.visible_panels(), ["license"]);
    assert_eq!(surface.pinyin, Some(false));
}

#[test]
fn exactly_one_panel_visible_after_any_selection_sequence() {
    let mut surface = VisibilitySurface::default();
    let mut panels = PanelController::new();

    for panel in [
        PanelId::Input,
        PanelId::Storage,
        PanelId::Definition,
        PanelId::Debug,
        PanelId::Input,
        PanelId::License,
    ] {
        panels.select(panel, &mut surface);
        assert_eq!(panels.selected(), panel);
        assert_eq!(surface.visible_panels(), [panel.name()]);
    }
}

#[test]
fn reselecting_the_active_panel_leaves_state_unchanged() {
    let mut surface = VisibilitySurface::default();
    let mut panels = PanelController::new();
    panels.select(PanelId::Input, &mut surface);
    let before = surface.visible_panels();

    panels.select(PanelId::Input, &mut surface);
    assert_eq!(panels.selected(), PanelId::Input);
    assert_eq!(surface.visible_panels(), before);
}

#[test]
fn pinyin_toggle_never_touches_panel_selection() {
    let mut surface = VisibilitySurface::default();
    let mut panels = PanelController::new();
    panels.select(PanelId::Input, &mut surface);

    assert!(panels.toggle_pinyin(&mut surface));
    assert_eq!(surface.pinyin, Some(true));
    assert_eq!(panels.selected(), PanelId::Input);
    assert_eq!(surface.visible_panels(), ["input"]);

    assert!(!panels.toggle_pinyin(&mut surface));
    assert_eq!(surface.pinyin, Some(false));
    assert_eq!(panels.selected(), PanelId::Input);
}

#[test]
fn panel_names_round_trip() {
    for panel in PanelId::ALL {
        assert_eq!(PanelId::from_name(panel.name()), Some(panel));
    }
    assert_eq!(PanelId::from_name("nonsense"), None);
}
