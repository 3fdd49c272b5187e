use nix::unistd::{Gid, Group, Uid, User};

/// Name for `uid`, or the number itself when no passwd entry exists.
pub fn user_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

/// Name for `gid`, or the number itself when no group entry exists.
pub fn group_name(gid: u32) -> String {
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(Some(group)) => group.name,
        _ => gid.to_string(),
    }
}

pub fn lookup_uid(name: &str) -> Option<Uid> {
    match User::from_name(name) {
        Ok(Some(user)) => Some(user.uid),
        _ => name.parse::<u32>().ok().map(Uid::from_raw),
    }
}

pub fn lookup_gid(name: &str) -> Option<Gid> {
    match Group::from_name(name) {
        Ok(Some(group)) => Some(group.gid),
        _ => name.parse::<u32>().ok().map(Gid::from_raw),
    }
}

pub fn current_user_name() -> String {
    user_name(Uid::effective().as_raw())
}

pub fn current_group_name() -> String {
    group_name(Gid::effective().as_raw())
}
