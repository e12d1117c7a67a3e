//! Frame rendering: three catalog panels or the playlist, plus the status
//! footer and toasts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use sonic_core::{
    CatalogService, Dispatcher, InputMode, Panel, PlaybackStatus, PlayerProcess, ShuffleRepeat,
    View,
};

use crate::theme::*;
use crate::widgets::text::{format_duration, progress_bar, truncate};
use crate::widgets::toast::ToastManager;

pub fn draw<S: CatalogService, P: PlayerProcess>(
    frame: &mut Frame,
    dispatcher: &Dispatcher<S, P>,
    toasts: &ToastManager,
    bottom_space: u16,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(bottom_space.max(3))])
        .split(frame.area());

    match dispatcher.view().current_view {
        View::Info => draw_panels(frame, chunks[0], dispatcher),
        View::Playlist => draw_playlist(frame, chunks[0], dispatcher),
    }
    draw_footer(frame, chunks[1], dispatcher);
    toasts.draw(frame, chunks[0]);
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        style_focused_border()
    } else {
        style_unfocused_border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, style_secondary()))
}

fn draw_panels<S: CatalogService, P: PlayerProcess>(
    frame: &mut Frame,
    area: Rect,
    dispatcher: &Dispatcher<S, P>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    let active = dispatcher.view().current_panel;

    for (panel, column) in Panel::ALL.into_iter().zip(columns.iter()) {
        let focused = panel == active;
        let inner_width = column.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = dispatcher
            .panel_names(panel)
            .into_iter()
            .map(|name| ListItem::new(truncate(name, inner_width)))
            .collect();
        let highlight = if focused {
            style_active()
        } else {
            style_inactive()
        };
        let list = List::new(items)
            .block(panel_block(panel.title().to_string(), focused))
            .style(style_default())
            .highlight_style(highlight);
        let mut state = ListState::default();
        state.select(dispatcher.panel_selected(panel));
        frame.render_stateful_widget(list, *column, &mut state);
    }
}

fn draw_playlist<S: CatalogService, P: PlayerProcess>(
    frame: &mut Frame,
    area: Rect,
    dispatcher: &Dispatcher<S, P>,
) {
    let playlist = dispatcher.playlist();
    let status = dispatcher.playback().status();
    let marker = match playlist.mode() {
        ShuffleRepeat::None => IND_PLAYING,
        mode => mode.indicator(),
    };
    let inner_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = playlist
        .entries()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let playing = status != PlaybackStatus::Stopped && i == playlist.current_playing();
            let prefix = if playing { marker } else { " " };
            let (label, length) = match dispatcher.resolve(track) {
                Some((artist, album, song)) => (
                    format!("{} - {} - {}", song.name, artist.name, album.name),
                    format_duration(song.duration_secs as u64),
                ),
                None => (track.song_id.clone(), String::new()),
            };
            let room = inner_width.saturating_sub(length.len() + 3);
            let text = format!("{} {:<room$} {}", prefix, truncate(&label, room), length, room = room);
            let style = if playing { style_playing() } else { style_default() };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    let title = format!("Playlist ({})", playlist.len());
    let list = List::new(items)
        .block(panel_block(title, true))
        .highlight_style(style_active());
    let mut state = ListState::default();
    state.select(playlist.selected());
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer<S: CatalogService, P: PlayerProcess>(
    frame: &mut Frame,
    area: Rect,
    dispatcher: &Dispatcher<S, P>,
) {
    let width = area.width as usize;
    let playback = dispatcher.playback();
    let status = playback.status();
    let mode = dispatcher.playlist().mode();

    let status_style = match status {
        PlaybackStatus::Playing => style_playing(),
        PlaybackStatus::Paused => style_paused(),
        PlaybackStatus::Stopped => style_muted(),
    };
    let mut lines = Vec::new();

    let now_playing = dispatcher.now_playing();
    let title = match now_playing {
        Some((artist, album, song)) => format!("{} - {} - {}", artist.name, album.name, song.name),
        None => String::new(),
    };
    let label = format!(" [{}] {} ", mode.indicator(), status.label());
    lines.push(Line::from(vec![
        Span::styled(label.clone(), status_style),
        Span::styled(
            truncate(&title, width.saturating_sub(label.len())),
            style_default(),
        ),
    ]));

    if let Some((_, _, song)) = now_playing {
        let elapsed = playback.play_elapsed_secs();
        let total = song.duration_secs as u64;
        let left = format!(" {} ", format_duration(elapsed));
        let right = format!(" {} ", format_duration(total));
        let bar_width = width.saturating_sub(left.len() + right.len());
        lines.push(Line::from(vec![
            Span::styled(left, style_secondary()),
            Span::styled(progress_bar(bar_width, elapsed, total), status_style),
            Span::styled(right, style_secondary()),
        ]));
    } else {
        lines.push(Line::from(""));
    }

    let prompt = match (dispatcher.mode(), dispatcher.search_query()) {
        (InputMode::Searching, Some(query)) => {
            Span::styled(format!(" /{}▏", query), style_filter())
        }
        (InputMode::SearchConfirmed, Some(query)) => Span::styled(
            format!(" /{}  (n/N: next/previous match)", query),
            style_filter(),
        ),
        (InputMode::AwaitingChord, _) => Span::styled(" g-", style_filter()),
        _ => Span::styled(
            " 1 catalog  2 playlist  / search  space add  enter play  q quit",
            style_muted(),
        ),
    };
    lines.push(Line::from(prompt));

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(style_unfocused_border());
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default()),
        area,
    );
}
