use crate::commands::CommandContext;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rolegate_client::AdminSession;
use rolegate_client::admin::{EmployeeView, EmployeesController, PermissionsController, RoleFilter, RolesController, ViewState};
use rolegate_client::audit::AuditLogViewer;
use rolegate_client::models::{ActionKind, Id};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabIndex {
    Permissions = 0,
    Roles = 1,
    Employees = 2,
    AuditLog = 3,
}

pub const TAB_TITLES: [&str; 4] = ["Permissions", "Roles", "Employees", "Audit Log"];

impl TabIndex {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => TabIndex::Permissions,
            1 => TabIndex::Roles,
            2 => TabIndex::Employees,
            3 => TabIndex::AuditLog,
            _ => TabIndex::Permissions,
        }
    }

    pub fn next(self) -> Self {
        Self::from_index((self as usize + 1) % 4)
    }

    pub fn previous(self) -> Self {
        Self::from_index((self as usize + 3) % 4)
    }
}

/// Field of an open permission or role form that receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    PickerSearch,
    Picker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box of the current tab
    Search,
    Prompt {
        kind: PromptKind,
        buffer: String,
    },
}

pub struct App {
    pub context: CommandContext,
    pub admin: AdminSession,
    pub current_tab: TabIndex,
    pub permissions: PermissionsController,
    pub roles: RolesController,
    pub employees: EmployeesController,
    pub audit: AuditLogViewer,
    /// Highlighted row per tab
    pub selected: [usize; 4],
    pub input_mode: InputMode,
    pub form_field: FormField,
    /// Cursor inside the permission picker or the role picker
    pub picker_cursor: usize,
    pub role_filter_open: bool,
    pub show_help: bool,
    pub status_message: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(context: CommandContext, admin: AdminSession) -> Self {
        let notices = context.notice_board();
        let audit = AuditLogViewer::new(context.api.config().effective_audit_fetch_size(), context.config.ui.audit_page_size);
        let mut app = Self {
            permissions: PermissionsController::new(notices.clone()),
            roles: RolesController::new(notices.clone()),
            employees: EmployeesController::new(notices),
            audit,
            context,
            admin,
            current_tab: TabIndex::Permissions,
            selected: [0; 4],
            input_mode: InputMode::Normal,
            form_field: FormField::Name,
            picker_cursor: 0,
            role_filter_open: false,
            show_help: false,
            status_message: "Welcome to the Rolegate admin console".to_string(),
            should_quit: false,
        };

        app.refresh_all();
        app
    }

    /// Load every tab; failures surface through each tab's banner
    pub fn refresh_all(&mut self) {
        let api = &self.context.api;
        let _ = self.context.block_on(self.permissions.load(api));
        let _ = self.context.block_on(self.roles.load(api));
        let _ = self.context.block_on(self.employees.load(api));
        let _ = self.context.block_on(self.audit.load(api));
        self.status_message = format!("Data refreshed at {}", chrono::Local::now().format("%H:%M:%S"));
    }

    pub fn refresh_current(&mut self) {
        let api = &self.context.api;
        let result = match self.current_tab {
            TabIndex::Permissions => self.context.block_on(self.permissions.load(api)),
            TabIndex::Roles => self.context.block_on(self.roles.load(api)),
            TabIndex::Employees => self.context.block_on(self.employees.load(api)),
            TabIndex::AuditLog => {
                if self.audit.records().is_empty() && !self.audit.is_access_denied() {
                    self.context.block_on(self.audit.load(api))
                } else {
                    self.context.block_on(self.audit.refresh(api))
                }
            }
        };
        self.status_message = match result {
            Ok(()) => format!("Data refreshed at {}", chrono::Local::now().format("%H:%M:%S")),
            Err(e) => format!("Refresh error: {}", e),
        };
        self.clamp_selection();
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = self.current_tab.previous();
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.permissions.tick(now);
        self.roles.tick(now);
        self.employees.tick(now);
    }

    pub fn get_refresh_rate(&self) -> u64 {
        self.context.config.ui.refresh_rate_ms
    }

    fn row_count(&self) -> usize {
        match self.current_tab {
            TabIndex::Permissions => self.permissions.filtered().len(),
            TabIndex::Roles => self.roles.filtered().len(),
            TabIndex::Employees => self.employees.filtered().len(),
            TabIndex::AuditLog => self.audit.visible().len(),
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        let selected = &mut self.selected[self.current_tab as usize];
        *selected = (*selected).min(count.saturating_sub(1));
    }

    pub fn scroll_up(&mut self) {
        let selected = &mut self.selected[self.current_tab as usize];
        *selected = selected.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let count = self.row_count();
        let selected = &mut self.selected[self.current_tab as usize];
        if *selected + 1 < count {
            *selected += 1;
        }
    }

    fn selected_permission(&self) -> Option<Id> {
        self.permissions.filtered().get(self.selected[TabIndex::Permissions as usize]).map(|p| p.id.clone())
    }

    fn selected_role(&self) -> Option<Id> {
        self.roles.filtered().get(self.selected[TabIndex::Roles as usize]).map(|r| r.id.clone())
    }

    fn selected_employee(&self) -> Option<Id> {
        self.employees.filtered().get(self.selected[TabIndex::Employees as usize]).map(|e| e.id.clone())
    }

    /// Role picker entries of the assign dialog; `None` stands for "no role"
    pub fn assign_options(&self) -> Vec<Option<Id>> {
        std::iter::once(None)
            .chain(self.employees.assignable_roles().into_iter().map(|r| Some(r.id.clone())))
            .collect()
    }

    /// Entries of the employee role filter, "no role" first
    pub fn role_filter_options(&self) -> Vec<RoleFilter> {
        std::iter::once(RoleFilter::NoRole)
            .chain(self.employees.roles().iter().map(|r| RoleFilter::Role(r.id.clone())))
            .collect()
    }

    fn modal_open(&self) -> bool {
        match self.current_tab {
            TabIndex::Permissions => !self.permissions.view().is_closed(),
            TabIndex::Roles => !self.roles.view().is_closed(),
            TabIndex::Employees => self.role_filter_open || *self.employees.view() != EmployeeView::Closed,
            TabIndex::AuditLog => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }
        if self.input_mode != InputMode::Normal {
            self.handle_input_key(key);
            return;
        }
        if self.modal_open() {
            match self.current_tab {
                TabIndex::Permissions => self.permission_modal_key(key),
                TabIndex::Roles => self.role_modal_key(key),
                TabIndex::Employees => self.employee_modal_key(key),
                TabIndex::AuditLog => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::Char('h') => self.show_help = true,
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.previous_tab(),
            KeyCode::Char('r') => self.refresh_current(),
            KeyCode::Up => self.scroll_up(),
            KeyCode::Down => self.scroll_down(),
            KeyCode::Esc => self.dismiss_notices(),
            KeyCode::Char('/') if self.current_tab != TabIndex::AuditLog => self.input_mode = InputMode::Search,
            _ => match self.current_tab {
                TabIndex::Permissions => self.permissions_key(key),
                TabIndex::Roles => self.roles_key(key),
                TabIndex::Employees => self.employees_key(key),
                TabIndex::AuditLog => self.audit_key(key),
            },
        }
    }

    fn dismiss_notices(&mut self) {
        match self.current_tab {
            TabIndex::Permissions => self.permissions.notices_mut().clear(),
            TabIndex::Roles => self.roles.notices_mut().clear(),
            TabIndex::Employees => self.employees.notices_mut().clear(),
            TabIndex::AuditLog => self.audit.dismiss_error(),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match &mut self.input_mode {
            InputMode::Normal => {}
            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                code => {
                    let mut term = self.current_search().to_string();
                    if edit_text(&mut term, code) {
                        self.set_current_search(term);
                        self.selected[self.current_tab as usize] = 0;
                    }
                }
            },
            InputMode::Prompt { kind, buffer } => match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Enter => {
                    let (kind, raw) = (*kind, std::mem::take(buffer));
                    self.input_mode = InputMode::Normal;
                    let result = match kind {
                        PromptKind::StartDate => self.audit.set_start_date(&raw),
                        PromptKind::EndDate => self.audit.set_end_date(&raw),
                    };
                    if let Err(e) = result {
                        self.status_message = e.to_string();
                    }
                    self.selected[TabIndex::AuditLog as usize] = 0;
                }
                code => {
                    edit_text(buffer, code);
                }
            },
        }
    }

    pub fn current_search(&self) -> &str {
        match self.current_tab {
            TabIndex::Permissions => self.permissions.search(),
            TabIndex::Roles => self.roles.search(),
            TabIndex::Employees => self.employees.search(),
            TabIndex::AuditLog => "",
        }
    }

    fn set_current_search(&mut self, term: String) {
        match self.current_tab {
            TabIndex::Permissions => self.permissions.set_search(term),
            TabIndex::Roles => self.roles.set_search(term),
            TabIndex::Employees => self.employees.set_search(term),
            TabIndex::AuditLog => {}
        }
    }

    fn permissions_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => {
                self.permissions.open_create();
                self.form_field = FormField::Name;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_permission() {
                    self.permissions.open_edit(&id);
                    self.form_field = FormField::Name;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_permission() {
                    self.permissions.request_delete(&id);
                }
            }
            _ => {}
        }
    }

    fn permission_modal_key(&mut self, key: KeyEvent) {
        let api = &self.context.api;
        if let ViewState::ConfirmingDelete(id) = self.permissions.view() {
            let id = id.clone();
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if self.context.block_on(self.permissions.confirm_delete(api)).is_ok() {
                        self.status_message = format!("Permission {} deleted", id);
                        self.clamp_selection();
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.permissions.cancel(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.permissions.cancel(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.form_field = match self.form_field {
                    FormField::Name => FormField::Description,
                    _ => FormField::Name,
                };
            }
            KeyCode::Enter => {
                if self.context.block_on(self.permissions.submit(api)).is_ok() {
                    self.status_message = "Permission saved".to_string();
                }
            }
            code => {
                let field = self.form_field;
                if let Some(form) = self.permissions.form_mut() {
                    let target = match field {
                        FormField::Description => &mut form.permission_description,
                        _ => &mut form.permission_name,
                    };
                    edit_text(target, code);
                }
            }
        }
    }

    fn roles_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => {
                self.roles.open_create();
                self.form_field = FormField::Name;
                self.picker_cursor = 0;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_role() {
                    self.roles.open_edit(&id);
                    self.form_field = FormField::Name;
                    self.picker_cursor = 0;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_role() {
                    self.roles.request_delete(&id);
                }
            }
            _ => {}
        }
    }

    fn role_modal_key(&mut self, key: KeyEvent) {
        let api = &self.context.api;
        if let ViewState::ConfirmingDelete(id) = self.roles.view() {
            let id = id.clone();
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if self.context.block_on(self.roles.confirm_delete(api)).is_ok() {
                        self.status_message = format!("Role {} deleted", id);
                        self.clamp_selection();
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.roles.cancel(),
                _ => {}
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('a') => self.roles.select_all_filtered(),
                KeyCode::Char('d') => self.roles.deselect_all(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.roles.cancel(),
            KeyCode::Enter => {
                if self.context.block_on(self.roles.submit(api)).is_ok() {
                    self.status_message = "Role saved".to_string();
                }
            }
            KeyCode::Tab => {
                self.form_field = match self.form_field {
                    FormField::Name => FormField::Description,
                    FormField::Description => FormField::PickerSearch,
                    FormField::PickerSearch => FormField::Picker,
                    FormField::Picker => FormField::Name,
                };
            }
            KeyCode::BackTab => {
                self.form_field = match self.form_field {
                    FormField::Name => FormField::Picker,
                    FormField::Description => FormField::Name,
                    FormField::PickerSearch => FormField::Description,
                    FormField::Picker => FormField::PickerSearch,
                };
            }
            code => match self.form_field {
                FormField::Picker => self.permission_picker_key(code),
                FormField::PickerSearch => {
                    let mut term = self.roles.picker_search().to_string();
                    if edit_text(&mut term, code) {
                        self.roles.set_picker_search(term);
                        self.picker_cursor = 0;
                    }
                }
                field => {
                    if let Some(form) = self.roles.form_mut() {
                        let target = match field {
                            FormField::Description => &mut form.role_description,
                            _ => &mut form.role_name,
                        };
                        edit_text(target, code);
                    }
                }
            },
        }
    }

    fn permission_picker_key(&mut self, code: KeyCode) {
        let visible: Vec<Id> = self.roles.picker_permissions().into_iter().map(|p| p.id.clone()).collect();
        match code {
            KeyCode::Up => self.picker_cursor = self.picker_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.picker_cursor + 1 < visible.len() {
                    self.picker_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = visible.get(self.picker_cursor) {
                    self.roles.toggle_permission(id);
                }
            }
            _ => {}
        }
    }

    fn employees_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') | KeyCode::Enter => {
                if let Some(id) = self.selected_employee() {
                    if self.employees.open_assign(&id) {
                        let current = self.employees.find(&id).and_then(|e| e.role_id()).cloned();
                        self.picker_cursor = self.assign_options().iter().position(|o| *o == current).unwrap_or(0);
                    }
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.selected_employee() {
                    if !self.employees.request_role_removal(&id) {
                        self.status_message = "This employee has no role to remove".to_string();
                    }
                }
            }
            KeyCode::Char('f') => {
                self.role_filter_open = true;
                self.picker_cursor = 0;
            }
            KeyCode::Char('c') => {
                self.employees.clear_role_filter();
                self.selected[TabIndex::Employees as usize] = 0;
            }
            _ => {}
        }
    }

    fn employee_modal_key(&mut self, key: KeyEvent) {
        let api = &self.context.api;

        if self.role_filter_open {
            let options = self.role_filter_options();
            match key.code {
                KeyCode::Esc | KeyCode::Char('f') | KeyCode::Enter => self.role_filter_open = false,
                KeyCode::Up => self.picker_cursor = self.picker_cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.picker_cursor + 1 < options.len() {
                        self.picker_cursor += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(entry) = options.get(self.picker_cursor) {
                        self.employees.toggle_role_filter(entry.clone());
                        self.selected[TabIndex::Employees as usize] = 0;
                    }
                }
                KeyCode::Char('c') => self.employees.clear_role_filter(),
                _ => {}
            }
            return;
        }

        match self.employees.view().clone() {
            EmployeeView::Closed => {}
            EmployeeView::AssigningRole { .. } => match key.code {
                KeyCode::Esc => self.employees.cancel(),
                KeyCode::Enter => {
                    if self.context.block_on(self.employees.submit_assignment(api)).is_ok() {
                        self.status_message = "Employee role updated".to_string();
                    }
                }
                KeyCode::Up | KeyCode::Down => {
                    let options = self.assign_options();
                    self.picker_cursor = match key.code {
                        KeyCode::Up => self.picker_cursor.saturating_sub(1),
                        _ => (self.picker_cursor + 1).min(options.len().saturating_sub(1)),
                    };
                    if let Some(choice) = options.get(self.picker_cursor) {
                        self.employees.select_role(choice.clone());
                    }
                }
                code => {
                    let mut term = self.employees.role_search().to_string();
                    if edit_text(&mut term, code) {
                        self.employees.set_role_search(term);
                        self.picker_cursor = 0;
                    }
                }
            },
            EmployeeView::ConfirmingRoleRemoval { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if self.context.block_on(self.employees.confirm_role_removal(api)).is_ok() {
                        self.status_message = "Role removed".to_string();
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.employees.cancel(),
                _ => {}
            },
        }
    }

    fn audit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::PageDown => {
                if self.audit.next_page() {
                    self.selected[TabIndex::AuditLog as usize] = 0;
                }
            }
            KeyCode::Left | KeyCode::PageUp => {
                if self.audit.prev_page() {
                    self.selected[TabIndex::AuditLog as usize] = 0;
                }
            }
            KeyCode::Home => self.audit.first_page(),
            KeyCode::End => self.audit.last_page(),
            KeyCode::Char('a') => {
                let next = next_action_kind(self.audit.filter().action_type.as_ref());
                self.audit.set_action_type(next);
            }
            KeyCode::Char('p') => {
                let next = next_page_name(self.audit.catalog(), self.audit.filter().page_name.as_deref());
                self.audit.set_page_name(next);
            }
            KeyCode::Char('f') => {
                self.input_mode = InputMode::Prompt {
                    kind: PromptKind::StartDate,
                    buffer: String::new(),
                }
            }
            KeyCode::Char('t') => {
                self.input_mode = InputMode::Prompt {
                    kind: PromptKind::EndDate,
                    buffer: String::new(),
                }
            }
            KeyCode::Char('c') => self.audit.clear_filters(),
            _ => return,
        }
        self.clamp_selection();
    }
}

/// Apply a text-editing key; true if the text changed
fn edit_text(target: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Backspace => target.pop().is_some(),
        KeyCode::Char(c) => {
            target.push(c);
            true
        }
        _ => false,
    }
}

/// Step the action filter through every known kind and back to "all"
pub fn next_action_kind(current: Option<&ActionKind>) -> Option<ActionKind> {
    match current {
        None => ActionKind::KNOWN.first().cloned(),
        Some(kind) => ActionKind::KNOWN
            .iter()
            .position(|k| k == kind)
            .and_then(|i| ActionKind::KNOWN.get(i + 1))
            .cloned(),
    }
}

/// Step the page filter through the catalog and back to "all"
pub fn next_page_name(catalog: &[String], current: Option<&str>) -> Option<String> {
    match current {
        None => catalog.first().cloned(),
        Some(page) => catalog.iter().position(|p| p == page).and_then(|i| catalog.get(i + 1)).cloned(),
    }
}
