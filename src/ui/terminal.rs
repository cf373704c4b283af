use {
    crate::{
        model::{Bin, BinStatus},
        query::{areas, BinFilter},
        session::SharedStore,
    },
    crossterm::event::{Event, KeyCode, KeyEventKind},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{io::Stdout, time::Duration},
};

const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Dashboard selection and feedback, owned by the event loop
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Index of the highlighted row among the visible bins
    pub selected: usize,
    /// Restricts the bins table
    pub filter: BinFilter,
    /// Acting driver for collections
    pub driver_id: String,
    /// Result of the last action, shown in the footer
    pub message: Option<String>,
}

impl ViewState {
    pub fn new(driver_id: String) -> Self {
        Self { driver_id, ..Self::default() }
    }

    pub fn select_next(&mut self, bin_count: usize) {
        if bin_count > 0 {
            self.selected = (self.selected + 1).min(bin_count - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Bins passing the current filter, in store order
    pub fn visible_bins<'a>(&self, bins: &'a [Bin]) -> Vec<&'a Bin> {
        self.filter.apply(bins)
    }

    /// Step the status filter: all, empty, half, full, overflow, all
    pub fn cycle_status_filter(&mut self) {
        self.filter.status = match self.filter.status {
            None => Some(BinStatus::Empty),
            Some(BinStatus::Empty) => Some(BinStatus::Half),
            Some(BinStatus::Half) => Some(BinStatus::Full),
            Some(BinStatus::Full) => Some(BinStatus::Overflow),
            Some(BinStatus::Overflow) => None,
        };
        self.selected = 0;
    }

    /// Step the area filter through `areas` in order, then back to all
    pub fn cycle_area_filter(&mut self, areas: &[String]) {
        let next = match &self.filter.area {
            None => areas.first(),
            Some(current) => areas
                .iter()
                .position(|a| a == current)
                .and_then(|i| areas.get(i + 1)),
        };
        self.filter.area = next.cloned();
        self.selected = 0;
    }

    /// Short description of the active filter for the table title
    pub fn filter_label(&self) -> String {
        let status = self.filter.status.map_or("all", |s| s.as_str());
        let area = self.filter.area.as_deref().unwrap_or("all areas");
        format!("{}, {}", status, area)
    }
}

/// Run the TUI event loop
///
/// Handles keyboard input and redraws every 500ms. Pressing `c` marks the
/// selected bin collected by `driver_id`. Returns when the user quits.
pub async fn run_ui(
    store: SharedStore,
    driver_id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;
    // Alternate screen keeps stderr logs out of the dashboard
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &store, ViewState::new(driver_id)).await;

    // Restore terminal state even if the loop failed
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    store: &SharedStore,
    mut view: ViewState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if crossterm::event::poll(REFRESH_INTERVAL)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => {
                        let guard = store.read().await;
                        let visible = view.visible_bins(guard.bins()).len();
                        view.select_next(visible);
                    }
                    KeyCode::Up | KeyCode::Char('k') => view.select_previous(),
                    KeyCode::Char('f') => view.cycle_status_filter(),
                    KeyCode::Char('a') => {
                        let known_areas = areas(store.read().await.bins());
                        view.cycle_area_filter(&known_areas);
                    }
                    KeyCode::Char('c') => collect_selected(store, &mut view).await,
                    _ => {}
                }
            }
        }

        let guard = store.read().await;
        let area = terminal.size()?;
        terminal.draw(|f| crate::ui::layout::render_layout(f, area, &guard, &view))?;
    }

    Ok(())
}

async fn collect_selected(store: &SharedStore, view: &mut ViewState) {
    let mut store = store.write().await;
    let Some(bin_id) = view
        .visible_bins(store.bins())
        .get(view.selected)
        .map(|b| b.id.clone())
    else {
        return;
    };

    view.message = Some(match store.mark_collected(&bin_id, &view.driver_id) {
        Ok(record) => format!(
            "{} collected ({:.0}% -> {}kg)",
            bin_id, record.fill_level_before, record.waste_amount
        ),
        Err(e) => {
            log::error!("Collection failed: {}", e);
            e.to_string()
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_stays_in_range() {
        let mut view = ViewState::new("driver-1".to_string());
        view.select_previous();
        assert_eq!(view.selected, 0);

        for _ in 0..10 {
            view.select_next(3);
        }
        assert_eq!(view.selected, 2);

        view.select_next(0);
        assert_eq!(view.selected, 2);
    }

    #[tokio::test]
    async fn test_collect_selected_reports_result() {
        use crate::{generator::FleetGenerator, state::FleetStore};
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let mut store = FleetStore::new(Some(4));
        store.initialize(&FleetGenerator::default());
        let store: SharedStore = Arc::new(RwLock::new(store));

        let mut view = ViewState::new("driver-2".to_string());
        view.selected = 5;
        collect_selected(&store, &mut view).await;

        let store_guard = store.read().await;
        assert_eq!(store_guard.bins()[5].fill_level, 0.0);
        assert!(view.message.as_deref().unwrap().starts_with("bin-6 collected"));
        drop(store_guard);

        let mut stranger = ViewState::new("driver-404".to_string());
        collect_selected(&store, &mut stranger).await;
        assert_eq!(stranger.message.as_deref(), Some("Driver not found: driver-404"));
    }

    #[test]
    fn test_filter_cycling_resets_selection() {
        let mut view = ViewState::new("driver-1".to_string());
        view.selected = 4;

        view.cycle_status_filter();
        assert_eq!(view.filter.status, Some(BinStatus::Empty));
        assert_eq!(view.selected, 0);
        for _ in 0..4 {
            view.cycle_status_filter();
        }
        assert_eq!(view.filter.status, None);

        let known = vec!["Downtown".to_string(), "Park District".to_string()];
        view.cycle_area_filter(&known);
        assert_eq!(view.filter.area.as_deref(), Some("Downtown"));
        assert_eq!(view.filter_label(), "all, Downtown");
        view.cycle_area_filter(&known);
        assert_eq!(view.filter.area.as_deref(), Some("Park District"));
        view.cycle_area_filter(&known);
        assert_eq!(view.filter.area, None);
        assert_eq!(view.filter_label(), "all, all areas");
    }

    #[tokio::test]
    async fn test_collect_selected_uses_filtered_rows() {
        use crate::{generator::FleetGenerator, state::FleetStore};
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let mut store = FleetStore::new(Some(9));
        store.initialize(&FleetGenerator::default());
        let area = store.bins()[3].location.area.clone();
        let expected = store
            .bins()
            .iter()
            .find(|b| b.location.area == area)
            .map(|b| b.id.clone())
            .unwrap();
        let store: SharedStore = Arc::new(RwLock::new(store));

        let mut view = ViewState::new("driver-1".to_string());
        view.filter.area = Some(area);
        collect_selected(&store, &mut view).await;

        let guard = store.read().await;
        assert_eq!(guard.bin(&expected).unwrap().fill_level, 0.0);
        assert_eq!(guard.collections().last().unwrap().bin_id, expected);
    }
}
