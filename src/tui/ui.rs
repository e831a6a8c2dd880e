use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{CreatorList, RunLog, StatusBar, TitleBar};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min, Percentage};
    let layout = Layout::vertical([Length(1), Min(0), Length(3), Length(1)]);
    let [title_area, main_area, input_area, status_area] = layout.areas(frame.area());
    let [list_area, log_area] =
        Layout::horizontal([Percentage(40), Percentage(60)]).areas(main_area);

    let labels = app
        .registry
        .iter()
        .map(|b| b.display_name.clone())
        .collect();
    TitleBar::new(labels, app.current, app.is_running()).render(frame, title_area);

    let binding = app.binding();
    CreatorList::new(
        &mut tui.creator_list,
        app.store.ids().as_slice(),
        binding.attribute_name.clone(),
    )
    .render(frame, list_area);

    let log_title = match &app.run {
        Some(run) => format!(
            "{} · {} · {}",
            run.platform_key,
            run.started_at.format("%H:%M:%S"),
            run.status
        ),
        None => "Crawler output".to_string(),
    };
    RunLog::new(&mut tui.run_log, &app.run_log, log_title).render(frame, log_area);

    tui.input_box.title = format!("Add to {}", binding.display_name);
    tui.input_box.render(frame, input_area);

    StatusBar::new(&app.notice).render(frame, status_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_app, write_platform_file};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_draw_ui_shows_all_regions() {
        let dir = tempfile::tempdir().unwrap();
        write_platform_file(dir.path(), "foo", "FOO_LIST = ['creator-1']\n");
        let app = test_app(dir.path());
        let mut tui = TuiState::new();

        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("F1 Foo"));
        assert!(text.contains("F2 Bar"));
        assert!(text.contains("1. creator-1"));
        assert!(text.contains("Crawler output"));
        assert!(text.contains("Add to Foo"));
        assert!(text.contains("Foo: 1 creators"));
    }
}
