use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use rolegate_client::admin::{EmployeeView, NoticeBoard, RoleFilter, ViewState};
use rolegate_client::models::ActionKind;

use crate::tui::app::{App, FormField, InputMode, PromptKind, TAB_TITLES, TabIndex};

/// Render the UI for the application.
pub fn ui(f: &mut Frame<'_>, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer with status
        ])
        .split(size);

    render_header(f, app, chunks[0]);
    render_content(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);

    match app.current_tab {
        TabIndex::Permissions => render_permission_modal(f, app, size),
        TabIndex::Roles => render_role_modal(f, app, size),
        TabIndex::Employees => render_employee_modal(f, app, size),
        TabIndex::AuditLog => {}
    }

    if app.show_help {
        render_help_popup(f, size);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let who = app
        .admin
        .user
        .name
        .as_deref()
        .or(app.admin.user.email.as_deref())
        .unwrap_or("admin");

    let tabs = Tabs::new(TAB_TITLES.to_vec())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Rolegate Admin Console ({})", who))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(app.current_tab as usize);

    f.render_widget(tabs, area);
}

fn render_content(f: &mut Frame<'_>, app: &App, area: Rect) {
    match app.current_tab {
        TabIndex::Permissions => render_permissions(f, app, area),
        TabIndex::Roles => render_roles(f, app, area),
        TabIndex::Employees => render_employees(f, app, area),
        TabIndex::AuditLog => render_audit(f, app, area),
    }
}

fn header_row(titles: Vec<&'static str>) -> Row<'static> {
    Row::new(titles).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn list_title(name: &str, search: &str, loading: bool) -> String {
    let mut title = name.to_string();
    if !search.is_empty() {
        title.push_str(&format!(" (search: {})", search));
    }
    if loading {
        title.push_str(" [loading]");
    }
    title
}

fn table_state(selected: usize, rows: usize) -> TableState {
    let mut state = TableState::default();
    if rows > 0 {
        state.select(Some(selected.min(rows - 1)));
    }
    state
}

fn render_permissions(f: &mut Frame<'_>, app: &App, area: Rect) {
    let permissions = app.permissions.filtered();
    let rows: Vec<Row> = permissions
        .iter()
        .map(|p| {
            Row::new(vec![
                p.id.to_string(),
                p.permission_name.clone(),
                p.permission_description.clone().unwrap_or_default(),
                p.created_at.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            ])
        })
        .collect();

    let title = list_title("Permissions", app.permissions.search(), app.permissions.is_loading());
    let table = Table::new(rows)
        .header(header_row(vec!["ID", "Name", "Description", "Created"]))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .widths(&[Constraint::Length(8), Constraint::Percentage(30), Constraint::Percentage(50), Constraint::Length(12)]);

    let mut state = table_state(app.selected[TabIndex::Permissions as usize], permissions.len());
    f.render_stateful_widget(table, area, &mut state);
}

fn render_roles(f: &mut Frame<'_>, app: &App, area: Rect) {
    let roles = app.roles.filtered();
    let rows: Vec<Row> = roles
        .iter()
        .map(|r| {
            let names: Vec<&str> = r.permissions.iter().map(|p| p.permission_name.as_str()).collect();
            Row::new(vec![
                r.id.to_string(),
                r.role_name.clone(),
                r.role_description.clone().unwrap_or_default(),
                names.join(", "),
            ])
        })
        .collect();

    let title = list_title("Roles", app.roles.search(), app.roles.is_loading());
    let table = Table::new(rows)
        .header(header_row(vec!["ID", "Name", "Description", "Permissions"]))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .widths(&[Constraint::Length(8), Constraint::Percentage(20), Constraint::Percentage(30), Constraint::Percentage(45)]);

    let mut state = table_state(app.selected[TabIndex::Roles as usize], roles.len());
    f.render_stateful_widget(table, area, &mut state);
}

fn role_filter_label(app: &App, entry: &RoleFilter) -> String {
    match entry {
        RoleFilter::NoRole => "No role".to_string(),
        RoleFilter::Role(id) => app
            .employees
            .roles()
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.role_name.clone())
            .unwrap_or_else(|| id.to_string()),
    }
}

fn render_employees(f: &mut Frame<'_>, app: &App, area: Rect) {
    let employees = app.employees.filtered();
    let rows: Vec<Row> = employees
        .iter()
        .map(|e| {
            let (role, style) = match &e.role {
                Some(role) => (role.role_name.clone().unwrap_or_else(|| role.id.to_string()), Style::default().fg(Color::Green)),
                None => ("No role".to_string(), Style::default().fg(Color::Gray)),
            };
            Row::new(vec![
                Cell::from(e.employee_id.clone().unwrap_or_default()),
                Cell::from(e.display_name()),
                Cell::from(e.email.clone().unwrap_or_default()),
                Cell::from(role).style(style),
            ])
        })
        .collect();

    let mut title = list_title("Employees", app.employees.search(), app.employees.is_loading());
    if !app.employees.role_filter().is_empty() {
        let labels: Vec<String> = app.employees.role_filter().iter().map(|entry| role_filter_label(app, entry)).collect();
        title.push_str(&format!(" (roles: {})", labels.join(", ")));
    }

    let table = Table::new(rows)
        .header(header_row(vec!["Code", "Name", "Email", "Role"]))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .widths(&[Constraint::Length(10), Constraint::Percentage(25), Constraint::Percentage(35), Constraint::Percentage(25)]);

    let mut state = table_state(app.selected[TabIndex::Employees as usize], employees.len());
    f.render_stateful_widget(table, area, &mut state);
}

fn action_style(kind: &ActionKind) -> Style {
    let color = match kind {
        ActionKind::Create => Color::Green,
        ActionKind::Edit => Color::Blue,
        ActionKind::Delete => Color::Red,
        ActionKind::BulkImport => Color::Magenta,
        ActionKind::AssignHierarchy => Color::Cyan,
        ActionKind::UnassignHierarchy => Color::Yellow,
        ActionKind::Other(_) => Color::Gray,
    };
    Style::default().fg(color)
}

fn render_audit(f: &mut Frame<'_>, app: &App, area: Rect) {
    if app.audit.is_access_denied() {
        let denied = Paragraph::new(vec![
            Line::from(Span::styled("Access Denied", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("You do not have the 'audit-log-view' permission."),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Audit Log"));
        f.render_widget(denied, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stats
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Records
        ])
        .split(area);

    let stats_line = match app.audit.stats() {
        Some(stats) => Line::from(vec![
            Span::raw(format!("Total: {}   ", stats.total_actions)),
            Span::styled(format!("Created: {}   ", stats.created), action_style(&ActionKind::Create)),
            Span::styled(format!("Edited: {}   ", stats.edited), action_style(&ActionKind::Edit)),
            Span::styled(format!("Deleted: {}", stats.deleted), action_style(&ActionKind::Delete)),
        ]),
        None => Line::from(Span::styled("Statistics unavailable", Style::default().fg(Color::Gray))),
    };
    f.render_widget(Paragraph::new(stats_line).block(Block::default().borders(Borders::ALL).title("Statistics")), chunks[0]);

    let filter = app.audit.filter();
    let filters = format!(
        "Action: {}   Page: {}   From: {}   To: {}",
        filter.action_type.as_ref().map(|k| k.label().to_string()).unwrap_or_else(|| "all".to_string()),
        filter.page_name.as_deref().unwrap_or("all"),
        filter.start_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string()),
        filter.end_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string()),
    );
    f.render_widget(Paragraph::new(filters).block(Block::default().borders(Borders::ALL).title("Filters")), chunks[1]);

    let visible = app.audit.visible();
    let rows: Vec<Row> = visible
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(entry.user_name.clone().unwrap_or_default()),
                Cell::from(entry.user_email.clone().unwrap_or_default()),
                Cell::from(entry.action_page.clone().unwrap_or_default()),
                Cell::from(entry.action_performed.label().to_string()).style(action_style(&entry.action_performed)),
            ])
        })
        .collect();

    let pager = app.audit.pager();
    let title = format!(
        "Audit Log (page {} of {}, {} records)",
        pager.current_page(),
        pager.total_pages().max(1),
        pager.total_count()
    );
    let table = Table::new(rows)
        .header(header_row(vec!["Timestamp", "User", "Email", "Page", "Action"]))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .widths(&[
            Constraint::Length(20),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(20),
        ]);

    let mut state = table_state(app.selected[TabIndex::AuditLog as usize], visible.len());
    f.render_stateful_widget(table, chunks[2], &mut state);
}

/// Toast first, then the sticky banner
fn notice_line(notices: &NoticeBoard) -> Option<Line<'_>> {
    if let Some(toast) = notices.current_toast() {
        return Some(Line::from(Span::styled(toast, Style::default().fg(Color::Yellow))));
    }
    notices
        .current_banner()
        .map(|banner| Line::from(Span::styled(banner, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))))
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default().direction(Direction::Horizontal).constraints([Constraint::Min(0), Constraint::Length(48)]).split(area);

    let status = match &app.input_mode {
        InputMode::Search => Line::from(format!("Search: {}_", app.current_search())),
        InputMode::Prompt { kind, buffer } => {
            let label = match kind {
                PromptKind::StartDate => "From (YYYY-MM-DD)",
                PromptKind::EndDate => "To (YYYY-MM-DD)",
            };
            Line::from(format!("{}: {}_", label, buffer))
        }
        InputMode::Normal => {
            let notice = match app.current_tab {
                TabIndex::Permissions => notice_line(app.permissions.notices()),
                TabIndex::Roles => notice_line(app.roles.notices()),
                TabIndex::Employees => notice_line(app.employees.notices()),
                TabIndex::AuditLog => app
                    .audit
                    .error()
                    .map(|e| Line::from(Span::styled(e, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)))),
            };
            notice.unwrap_or_else(|| Line::from(app.status_message.as_str()))
        }
    };
    let status = Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status")).wrap(Wrap { trim: true });
    f.render_widget(status, chunks[0]);

    let help_text = match app.current_tab {
        TabIndex::Permissions | TabIndex::Roles => "n: New | e: Edit | d: Delete | /: Search | ?: Help",
        TabIndex::Employees => "a: Assign | x: Remove | f: Filter | /: Search | ?: Help",
        TabIndex::AuditLog => "a: Action | p: Page | f/t: Dates | c: Clear | ?: Help",
    };
    let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title("Controls")).alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![Span::styled(format!("{:<13}", label), style), Span::raw(value), Span::raw(cursor)])
}

fn render_confirm(f: &mut Frame<'_>, area: Rect, title: &str, question: String) {
    let popup_area = centered_rect(50, 20, area);
    let body = Paragraph::new(vec![Line::from(question), Line::from(""), Line::from("y: Confirm | n: Cancel")])
        .block(Block::default().borders(Borders::ALL).title(title.to_string()).border_style(Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup_area);
    f.render_widget(body, popup_area);
}

fn render_permission_modal(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (title, form) = match app.permissions.view() {
        ViewState::Closed => return,
        ViewState::ConfirmingDelete(id) => {
            let name = app.permissions.find(id).map(|p| p.permission_name.as_str()).unwrap_or("?");
            render_confirm(f, area, "Delete Permission", format!("Delete permission '{}'? This cannot be undone.", name));
            return;
        }
        ViewState::Creating(form) => ("New Permission", form),
        ViewState::Editing(_, form) => ("Edit Permission", form),
    };

    let popup_area = centered_rect(60, 30, area);
    let mut lines = vec![
        field_line("Name:", &form.permission_name, app.form_field == FormField::Name),
        field_line("Description:", &form.permission_description, app.form_field == FormField::Description),
        Line::from(""),
    ];
    if app.permissions.is_submitting() {
        lines.push(Line::from("Saving..."));
    }
    if let Some(toast) = app.permissions.notices().current_toast() {
        lines.push(Line::from(Span::styled(toast, Style::default().fg(Color::Red))));
    }
    lines.push(Line::from("Tab: Next field | Enter: Save | Esc: Cancel"));

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)).wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(body, popup_area);
}

fn render_role_modal(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (title, form) = match app.roles.view() {
        ViewState::Closed => return,
        ViewState::ConfirmingDelete(id) => {
            let name = app.roles.find(id).map(|r| r.role_name.as_str()).unwrap_or("?");
            render_confirm(f, area, "Delete Role", format!("Delete role '{}'? This cannot be undone.", name));
            return;
        }
        ViewState::Creating(form) => ("New Role", form),
        ViewState::Editing(_, form) => ("Edit Role", form),
    };

    let popup_area = centered_rect(70, 80, area);
    f.render_widget(Clear, popup_area);
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Name, description, picker search
            Constraint::Min(0),    // Permission picker
            Constraint::Length(2), // Hints
        ])
        .split(inner);

    let fields = Paragraph::new(vec![
        field_line("Name:", &form.role_name, app.form_field == FormField::Name),
        field_line("Description:", &form.role_description, app.form_field == FormField::Description),
        field_line("Find:", app.roles.picker_search(), app.form_field == FormField::PickerSearch),
    ]);
    f.render_widget(fields, chunks[0]);

    let picker = app.roles.picker_permissions();
    let items: Vec<ListItem> = picker
        .iter()
        .map(|p| {
            let mark = if form.is_selected(&p.id) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {}", mark, p.permission_name))
        })
        .collect();
    let border = if app.form_field == FormField::Picker { Color::Yellow } else { Color::White };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Permissions ({} selected)", form.permission_ids.len()))
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if app.form_field == FormField::Picker && !picker.is_empty() {
        state.select(Some(app.picker_cursor.min(picker.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    let hint = match app.roles.notices().current_toast() {
        Some(toast) => Line::from(Span::styled(toast, Style::default().fg(Color::Red))),
        None if app.roles.is_submitting() => Line::from("Saving..."),
        None => Line::from("Tab: Next | Space: Toggle | Ctrl-A: All | Ctrl-D: None | Enter: Save | Esc: Cancel"),
    };
    f.render_widget(Paragraph::new(hint).wrap(Wrap { trim: true }), chunks[2]);
}

fn render_employee_modal(f: &mut Frame<'_>, app: &App, area: Rect) {
    if app.role_filter_open {
        let options = app.role_filter_options();
        let items: Vec<ListItem> = options
            .iter()
            .map(|entry| {
                let mark = if app.employees.role_filter().contains(entry) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, role_filter_label(app, entry)))
            })
            .collect();
        let popup_area = centered_rect(40, 60, area);
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Filter by Role (Space: Toggle, c: Clear, Esc: Close)"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select(Some(app.picker_cursor.min(options.len().saturating_sub(1))));
        f.render_widget(Clear, popup_area);
        f.render_stateful_widget(list, popup_area, &mut state);
        return;
    }

    match app.employees.view() {
        EmployeeView::Closed => {}
        EmployeeView::ConfirmingRoleRemoval { employee_id, role_id } => {
            let employee = app.employees.find(employee_id).map(|e| e.display_name()).unwrap_or_default();
            let role = app
                .employees
                .find(employee_id)
                .and_then(|e| e.role.as_ref())
                .and_then(|r| r.role_name.clone())
                .unwrap_or_else(|| role_id.to_string());
            render_confirm(f, area, "Remove Role", format!("Remove role '{}' from {}?", role, employee));
        }
        EmployeeView::AssigningRole { employee_id, selected } => {
            let employee = app.employees.find(employee_id).map(|e| e.display_name()).unwrap_or_default();
            let popup_area = centered_rect(50, 60, area);
            f.render_widget(Clear, popup_area);
            let outer = Block::default().borders(Borders::ALL).title(format!("Assign Role to {}", employee));
            let inner = outer.inner(popup_area);
            f.render_widget(outer, popup_area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
                .split(inner);

            f.render_widget(Paragraph::new(format!("Find: {}_", app.employees.role_search())), chunks[0]);

            let options = app.assign_options();
            let items: Vec<ListItem> = options
                .iter()
                .map(|option| {
                    let mark = if option == selected { "(*)" } else { "( )" };
                    let label = match option {
                        None => "No role".to_string(),
                        Some(id) => role_filter_label(app, &RoleFilter::Role(id.clone())),
                    };
                    ListItem::new(format!("{} {}", mark, label))
                })
                .collect();
            let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut state = ListState::default();
            state.select(Some(app.picker_cursor.min(options.len().saturating_sub(1))));
            f.render_stateful_widget(list, chunks[1], &mut state);

            let hint = match app.employees.notices().current_toast() {
                Some(toast) => Line::from(Span::styled(toast, Style::default().fg(Color::Red))),
                None if app.employees.is_submitting() => Line::from("Saving..."),
                None => Line::from("Up/Down: Choose | Enter: Save | Esc: Cancel"),
            };
            f.render_widget(Paragraph::new(hint), chunks[2]);
        }
    }
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = vec![
        Line::from("Rolegate Admin Console - Help"),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Tab / Shift+Tab  - Switch between tabs"),
        Line::from("  Up / Down        - Move selection"),
        Line::from("  /                - Search the current list"),
        Line::from("  r                - Refresh the current tab"),
        Line::from("  Esc              - Dismiss messages, close dialogs"),
        Line::from("  q                - Quit application"),
        Line::from(""),
        Line::from("Permissions and Roles:"),
        Line::from("  n / e / d        - New, edit, delete"),
        Line::from("  Space            - Toggle a permission in the role form"),
        Line::from("  Ctrl-A / Ctrl-D  - Select all shown / clear selection"),
        Line::from(""),
        Line::from("Employees:"),
        Line::from("  a                - Assign a role"),
        Line::from("  x                - Remove the current role"),
        Line::from("  f / c            - Role filter / clear filter"),
        Line::from(""),
        Line::from("Audit Log:"),
        Line::from("  Left / Right     - Previous / next page"),
        Line::from("  a / p            - Cycle action / page filter"),
        Line::from("  f / t            - Set from / to date"),
        Line::from("  c                - Clear filters"),
        Line::from(""),
        Line::from("Press '?' or 'Esc' to close this help."),
    ];

    let help_paragraph = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title("Help")).wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(help_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
