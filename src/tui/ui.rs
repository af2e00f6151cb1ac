//! Frame composition: title bar, banner, upload strip, conversation, composer,
//! and whichever overlay is open.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::state::App;
use crate::core::upload::{UploadBatch, UploadStatus};
use crate::tui::component::Component;
use crate::tui::components::{
    LandingPage, MessageList, SessionManager, StudyForm, TitleBar, UploadForm,
};
use crate::tui::palette::Palette;
use crate::tui::{Overlay, TuiState};

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title: Rect,
    pub banner: Rect,
    pub upload: Rect,
    pub main: Rect,
    pub input: Rect,
}

impl ScreenLayout {
    /// Banner and upload strip collapse to zero height when there is nothing to show.
    pub fn compute(area: Rect, input_height: u16, banner: bool, upload: bool) -> Self {
        use Constraint::{Length, Min};
        let [title, banner, upload, main, input] = Layout::vertical([
            Length(1),
            Length(u16::from(banner)),
            Length(u16::from(upload)),
            Min(0),
            Length(input_height),
        ])
        .areas(area);
        Self {
            title,
            banner,
            upload,
            main,
            input,
        }
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let palette = Palette::for_theme(app.theme);
    let area = frame.area();
    let input_height = tui.input_box.calculate_height(area.width);
    let layout = ScreenLayout::compute(area, input_height, app.banner.is_some(), app.upload.is_some());
    tui.main_area = layout.main;

    // Title bar
    let mut title_bar = TitleBar::from_app(app, palette, tui.message_list.has_unseen_content());
    title_bar.render(frame, layout.title);

    if let Some(banner) = &app.banner {
        frame.render_widget(
            Line::styled(format!(" {}", banner.text), palette.banner_style(banner.kind)),
            layout.banner,
        );
    }
    if let Some(batch) = &app.upload {
        frame.render_widget(upload_strip(batch, &palette), layout.upload);
    }

    // Main area: welcome screen until the first message, then the conversation
    if app.transcript.is_empty() && !app.busy {
        LandingPage::new(palette).render(frame, layout.main);
    } else {
        MessageList::new(
            &mut tui.message_list,
            &app.transcript,
            &palette,
            app.busy,
            spinner_frame,
        )
        .render(frame, layout.main);
    }

    tui.input_box.palette = palette;
    tui.input_box.render(frame, layout.input);

    match &mut tui.overlay {
        Some(Overlay::Sessions(state)) => SessionManager::new(
            state,
            app.session.sessions(),
            app.session.current_id(),
            app.refresh_in_flight,
            &palette,
        )
        .render(frame, area),
        Some(Overlay::Upload(state)) => {
            UploadForm::new(state, app.upload.as_ref(), &palette).render(frame, area)
        }
        Some(Overlay::Study(state)) => StudyForm::new(state, &palette).render(frame, area),
        None => {}
    }
}

/// One line per batch: each file with its size, then the batch status.
fn upload_strip(batch: &UploadBatch, palette: &Palette) -> Line<'static> {
    let files = batch
        .files
        .iter()
        .map(|f| format!("{} ({})", f.name, f.size_label()))
        .collect::<Vec<_>>()
        .join(", ");
    let (status, color) = match &batch.status {
        UploadStatus::Pending => ("uploading...".to_string(), palette.info),
        UploadStatus::Success { processed } => (format!("{processed} processed"), palette.success),
        UploadStatus::Error(_) => ("failed".to_string(), palette.error),
    };
    Line::from(vec![
        Span::styled(format!(" 📎 {files}"), Style::default().fg(palette.fg)),
        Span::styled(" · ", palette.muted_style()),
        Span::styled(status, Style::default().fg(color)),
    ])
}

/// Which message (if any) is drawn at screen row `screen_y`.
pub fn hit_test_message(
    screen_y: u16,
    main_area: Rect,
    scroll_offset_y: u16,
    prefix_heights: &[u16],
) -> Option<usize> {
    if screen_y < main_area.y || screen_y >= main_area.y + main_area.height {
        return None;
    }
    let content_y = (screen_y - main_area.y).saturating_add(scroll_offset_y);
    let index = prefix_heights.partition_point(|&end| end <= content_y);
    (index < prefix_heights.len()).then_some(index)
}
