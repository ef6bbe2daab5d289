pub mod document;
pub mod group;
pub mod join_request;
pub mod leader_request;
pub mod phase;
pub mod submission;
pub mod user;

pub use document::{Document, NewDocument};
pub use group::{Group, GroupRanking, GroupWithMembers, NewGroup};
pub use join_request::{JoinRequest, JoinRequestDetails, RequestStatus};
pub use leader_request::{LeaderRequest, LeaderRequestDetails};
pub use phase::{NewPhase, Phase, PhaseUpdate};
pub use submission::{NewSubmission, Submission};
pub use user::{NewUser, User, UserRole};
