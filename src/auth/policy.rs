//! Role-based authorization.
//!
//! Every protected handler names the [`Action`] it performs and asks
//! [`allowed`] before reading or writing anything. Ownership checks (leading a
//! specific group, belonging to it) are made by the services on top of this.

use crate::database::models::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewProfile,
    RegisterCoordinator,
    ListUsers,
    ReviewUsers,
    RequestLeader,
    ReviewLeaderRequests,
    ViewGroups,
    CreateGroup,
    ApproveGroup,
    RequestJoin,
    ManageJoinRequests,
    LeaveGroup,
    ViewSchedule,
    ManageSchedule,
    ViewSubmissions,
    Submit,
    Grade,
    ViewResults,
    ViewDocuments,
    UploadDocument,
    Subscribe,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewProfile => "view_profile",
            Action::RegisterCoordinator => "register_coordinator",
            Action::ListUsers => "list_users",
            Action::ReviewUsers => "review_users",
            Action::RequestLeader => "request_leader",
            Action::ReviewLeaderRequests => "review_leader_requests",
            Action::ViewGroups => "view_groups",
            Action::CreateGroup => "create_group",
            Action::ApproveGroup => "approve_group",
            Action::RequestJoin => "request_join",
            Action::ManageJoinRequests => "manage_join_requests",
            Action::LeaveGroup => "leave_group",
            Action::ViewSchedule => "view_schedule",
            Action::ManageSchedule => "manage_schedule",
            Action::ViewSubmissions => "view_submissions",
            Action::Submit => "submit",
            Action::Grade => "grade",
            Action::ViewResults => "view_results",
            Action::ViewDocuments => "view_documents",
            Action::UploadDocument => "upload_document",
            Action::Subscribe => "subscribe",
        }
    }
}

/// The single authorization predicate.
pub fn allowed(action: Action, role: UserRole) -> bool {
    use UserRole::*;

    if role == Inactive {
        return false;
    }

    match action {
        // A pending account can see itself and nothing else
        Action::ViewProfile => true,

        Action::ViewGroups
        | Action::ViewSchedule
        | Action::ViewSubmissions
        | Action::ViewResults
        | Action::ViewDocuments
        | Action::Subscribe => role != Pending,

        Action::RegisterCoordinator | Action::ManageSchedule => role == Superadmin,

        Action::ListUsers
        | Action::ReviewUsers
        | Action::ReviewLeaderRequests
        | Action::ApproveGroup => matches!(role, Coordinator | Superadmin),

        Action::Grade => role == Coordinator,

        Action::RequestLeader | Action::RequestJoin => role == Student,

        Action::CreateGroup
        | Action::ManageJoinRequests
        | Action::Submit
        | Action::UploadDocument => role == Leader,

        Action::LeaveGroup => matches!(role, Student | Leader),
    }
}
