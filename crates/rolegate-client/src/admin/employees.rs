// Rolegate
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Employees tab: role assignment and removal

use super::notice::NoticeBoard;
use super::{list_failure, matches_search};
use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{Employee, Id, Role, RoleAssignment};
use std::time::Instant;
use tracing::{error, info, warn};

const FETCH_FAILED: &str = "Failed to fetch employee data";
const ASSIGN_FAILED: &str = "Failed to update employee roles";
const REMOVE_FAILED: &str = "Failed to remove role";

/// One entry of the role filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoleFilter {
    /// Employees without any role
    NoRole,
    Role(Id),
}

impl RoleFilter {
    /// Parse a CLI value; `no-role` is the sentinel
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "no-role" => RoleFilter::NoRole,
            other => RoleFilter::Role(Id::parse(other)),
        }
    }
}

/// Modal state of the employees tab
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EmployeeView {
    #[default]
    Closed,
    /// Single-select role picker; `None` means "no role"
    AssigningRole { employee_id: Id, selected: Option<Id> },
    ConfirmingRoleRemoval { employee_id: Id, role_id: Id },
}

#[derive(Debug, Default)]
pub struct EmployeesController {
    employees: Vec<Employee>,
    roles: Vec<Role>,
    search: String,
    role_filter: Vec<RoleFilter>,
    role_search: String,
    view: EmployeeView,
    submitting: bool,
    loading: bool,
    notices: NoticeBoard,
}

impl EmployeesController {
    pub fn new(notices: NoticeBoard) -> Self {
        Self {
            notices,
            ..Default::default()
        }
    }

    /// Fetch employees, then roles.
    ///
    /// Only the employee list is required; if roles cannot be loaded the tab
    /// works with an empty role list.
    pub async fn load(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        self.loading = true;
        let employees = api.list_employees().await;
        let roles = api.list_roles().await;
        self.loading = false;

        match roles {
            Ok(roles) => self.roles = roles,
            Err(e) => {
                warn!("Roles not available, using empty list: {}", e);
                self.roles.clear();
            }
        }

        match employees {
            Ok(employees) => {
                self.employees = employees;
                self.notices.dismiss_banner();
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch employees: {}", e);
                self.notices.banner(list_failure(&e, FETCH_FAILED));
                Err(e)
            }
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn find(&self, id: &Id) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn role_filter(&self) -> &[RoleFilter] {
        &self.role_filter
    }

    pub fn toggle_role_filter(&mut self, entry: RoleFilter) {
        if let Some(pos) = self.role_filter.iter().position(|f| f == &entry) {
            self.role_filter.remove(pos);
        } else {
            self.role_filter.push(entry);
        }
    }

    pub fn set_role_filter(&mut self, filter: Vec<RoleFilter>) {
        self.role_filter = filter;
    }

    pub fn clear_role_filter(&mut self) {
        self.role_filter.clear();
    }

    fn matches_role_filter(&self, employee: &Employee) -> bool {
        if self.role_filter.is_empty() {
            return true;
        }
        if self.role_filter.contains(&RoleFilter::NoRole) {
            return employee.role.is_none();
        }
        match employee.role_id() {
            Some(id) => self.role_filter.iter().any(|f| matches!(f, RoleFilter::Role(r) if r == id)),
            None => false,
        }
    }

    /// Employees matching both the search term and the role filter
    pub fn filtered(&self) -> Vec<&Employee> {
        let term = self.search.as_str();
        self.employees
            .iter()
            .filter(|e| {
                matches_search(e.first_name.as_deref(), term)
                    || matches_search(e.last_name.as_deref(), term)
                    || matches_search(e.email.as_deref(), term)
                    || matches_search(e.employee_id.as_deref(), term)
            })
            .filter(|e| self.matches_role_filter(e))
            .collect()
    }

    pub fn role_search(&self) -> &str {
        &self.role_search
    }

    pub fn set_role_search(&mut self, term: impl Into<String>) {
        self.role_search = term.into();
    }

    /// Roles offered by the assignment picker
    pub fn assignable_roles(&self) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|r| matches_search(Some(&r.role_name), &self.role_search) || matches_search(r.role_description.as_deref(), &self.role_search))
            .collect()
    }

    pub fn view(&self) -> &EmployeeView {
        &self.view
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn tick(&mut self, now: Instant) {
        self.notices.tick(now);
    }

    pub fn cancel(&mut self) {
        self.view = EmployeeView::Closed;
    }

    /// Open the role picker with the employee's current role selected
    pub fn open_assign(&mut self, employee_id: &Id) -> bool {
        let Some(employee) = self.find(employee_id) else {
            return false;
        };
        let selected = employee.role_id().cloned();
        self.role_search.clear();
        self.notices.dismiss_toast();
        self.view = EmployeeView::AssigningRole {
            employee_id: employee_id.clone(),
            selected,
        };
        true
    }

    /// Pick a role in the open picker, replacing any earlier pick
    pub fn select_role(&mut self, role: Option<Id>) {
        if let EmployeeView::AssigningRole { selected, .. } = &mut self.view {
            *selected = role;
        }
    }

    pub async fn submit_assignment(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let EmployeeView::AssigningRole { employee_id, selected } = &self.view else {
            return Err(ConsoleError::validation("No role assignment is open"));
        };
        let employee_id = employee_id.clone();
        let assignment = RoleAssignment::single(selected.clone());

        self.submitting = true;
        let result = api.assign_employee_roles(&employee_id, &assignment).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                info!("Updated roles of employee {}", employee_id);
                self.view = EmployeeView::Closed;
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to update roles of employee {}: {}", employee_id, e);
                self.notices.toast(e.user_message(ASSIGN_FAILED));
                Err(e)
            }
        }
    }

    /// Ask to remove the employee's current role; false if it has none
    pub fn request_role_removal(&mut self, employee_id: &Id) -> bool {
        let Some(role_id) = self.find(employee_id).and_then(|e| e.role_id()).cloned() else {
            return false;
        };
        self.view = EmployeeView::ConfirmingRoleRemoval {
            employee_id: employee_id.clone(),
            role_id,
        };
        true
    }

    pub async fn confirm_role_removal(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let EmployeeView::ConfirmingRoleRemoval { employee_id, role_id } = &self.view else {
            return Err(ConsoleError::validation("No role removal is awaiting confirmation"));
        };
        let (employee_id, role_id) = (employee_id.clone(), role_id.clone());
        self.view = EmployeeView::Closed;

        self.submitting = true;
        let result = api.remove_employee_role(&employee_id, &role_id).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                info!("Removed role {} from employee {}", role_id, employee_id);
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to remove role {} from employee {}: {}", role_id, employee_id, e);
                self.notices.toast(e.user_message(REMOVE_FAILED));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    struct Fixture {
        api: MockBackend,
        admin: Id,
        viewer: Id,
        ana: Id,
        bob: Id,
        cy: Id,
    }

    fn fixture() -> Fixture {
        let api = MockBackend::new();
        let admin = api.add_role("Admin", &[]);
        let viewer = api.add_role("Viewer", &[]);
        let ana = api.add_employee("Ana", "Lopez", "ana@acme.io", "SS-001", Some(&admin));
        let bob = api.add_employee("Bob", "Stone", "bob@acme.io", "SS-002", None);
        let cy = api.add_employee("Cy", "Twombly", "cy@acme.io", "SS-003", Some(&viewer));
        Fixture { api, admin, viewer, ana, bob, cy }
    }

    fn ids(employees: Vec<&Employee>) -> Vec<Id> {
        employees.into_iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn no_role_filter_returns_exactly_unassigned() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        controller.set_role_filter(vec![RoleFilter::NoRole]);
        assert_eq!(ids(controller.filtered()), vec![f.bob.clone()]);

        // the sentinel wins over role ids
        controller.toggle_role_filter(RoleFilter::Role(f.admin.clone()));
        assert_eq!(ids(controller.filtered()), vec![f.bob.clone()]);

        controller.toggle_role_filter(RoleFilter::NoRole);
        assert_eq!(ids(controller.filtered()), vec![f.ana.clone()]);

        controller.toggle_role_filter(RoleFilter::Role(f.viewer.clone()));
        assert_eq!(ids(controller.filtered()), vec![f.ana.clone(), f.cy.clone()]);

        controller.clear_role_filter();
        assert_eq!(controller.filtered().len(), 3);
    }

    #[tokio::test]
    async fn search_covers_names_email_and_code() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        controller.set_search("stone");
        assert_eq!(ids(controller.filtered()), vec![f.bob.clone()]);
        controller.set_search("ss-003");
        assert_eq!(ids(controller.filtered()), vec![f.cy.clone()]);
        controller.set_search("ACME.IO");
        assert_eq!(controller.filtered().len(), 3);
    }

    #[tokio::test]
    async fn assignment_is_single_select() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        assert!(controller.open_assign(&f.bob));
        controller.select_role(Some(f.admin.clone()));
        controller.select_role(Some(f.viewer.clone()));
        controller.submit_assignment(&f.api).await.unwrap();

        assert_eq!(f.api.employee(&f.bob).unwrap().role_id(), Some(&f.viewer));
        assert_eq!(controller.find(&f.bob).unwrap().role_id(), Some(&f.viewer));
        assert_eq!(*controller.view(), EmployeeView::Closed);
    }

    #[tokio::test]
    async fn role_removal_needs_confirmation_and_a_role() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        assert!(!controller.request_role_removal(&f.bob));
        assert!(controller.confirm_role_removal(&f.api).await.is_err());
        assert_eq!(f.api.calls("remove_role"), 0);

        assert!(controller.request_role_removal(&f.ana));
        controller.confirm_role_removal(&f.api).await.unwrap();
        assert!(f.api.employee(&f.ana).unwrap().role.is_none());
    }

    #[tokio::test]
    async fn roles_are_optional_employees_are_not() {
        let f = fixture();
        f.api.fail_next("list_roles");
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();
        assert!(controller.roles().is_empty());
        assert_eq!(controller.employees().len(), 3);
        assert_eq!(controller.notices().current_banner(), None);

        f.api.fail_next("list_employees");
        assert!(controller.load(&f.api).await.is_err());
        assert_eq!(controller.notices().current_banner(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn picker_search_matches_name_or_description() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        controller.open_assign(&f.ana);
        controller.set_role_search("view");
        let names: Vec<&str> = controller.assignable_roles().iter().map(|r| r.role_name.as_str()).collect();
        assert_eq!(names, vec!["Viewer"]);
    }

    #[tokio::test]
    async fn failed_assignment_keeps_picker_open() {
        let f = fixture();
        let mut controller = EmployeesController::default();
        controller.load(&f.api).await.unwrap();

        controller.open_assign(&f.cy);
        f.api.fail_next_with("assign_roles", 403, Some("Cannot change own role"), None);
        assert!(controller.submit_assignment(&f.api).await.is_err());
        assert_eq!(controller.notices().current_toast(), Some("Cannot change own role"));
        assert!(matches!(controller.view(), EmployeeView::AssigningRole { .. }));
    }
}
