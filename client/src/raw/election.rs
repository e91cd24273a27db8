use cragclub_shared::{
    election::{handle::*, Candidate, ElectionStatus, Referendum},
    gear::handle::CreatedResult,
};

pub struct Status;

pub struct Candidates;

pub struct Withdraw;

pub struct Referendums;

/// Clears the election cycle.
pub struct Reset;

requests! {
    empty Status => "/api/election/status": ElectionStatus,
    empty Candidates => "/api/election/candidates": Vec<Candidate>,
    json ApplyDescriptor => "/api/election/apply": CreatedResult,
    empty Withdraw => "/api/election/withdraw": (),
    json VoteDescriptor => "/api/election/vote": (),
    empty Referendums => "/api/election/referendums": Vec<Referendum>,
    json ReferendumVoteDescriptor => "/api/election/referendum/vote": (),
    json SetElectionsOpenDescriptor => "/api/election/manage/set-open": (),
    json ReferendumDescriptor => "/api/election/manage/referendum": CreatedResult,
    empty Reset => "/api/election/manage/reset": (),
}
