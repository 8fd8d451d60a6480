//! Admin command line for the community hub API: comment moderation, reply
//! threads, events, gallery, organizers, registrations and the contact inbox.
//! Every command prints JSON on stdout; logs go to stderr.

pub mod cli;
pub mod commands;
