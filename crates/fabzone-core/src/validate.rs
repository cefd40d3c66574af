// ── Operand validation ──
//
// Shape checks applied before a handler touches the model. Each check
// returns the parsed `Operands` or a `ZoneError` naming the offending
// argument. Handlers pick the check that matches their argument shape.

use crate::error::ZoneError;
use crate::model::{is_valid_zone_name, normalize_member};
use crate::operation::{OperationKind, OperationRequest};

/// Accepted `defzone` options.
pub const DEFZONE_OPTIONS: [&str; 3] = ["--noaccess", "--allaccess", "--show"];

/// Tokens that mark a `-force` request inside `p0`.
const FORCE_FLAGS: [&str; 2] = ["-f", "-force"];

/// Validated arguments of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operands {
    pub operand: String,
    /// `p0`, normalized.
    pub members: Vec<String>,
    /// `p1`, normalized.
    pub principals: Vec<String>,
    /// `p0` was exactly a force token.
    pub force_flag: bool,
}

fn normalized(list: &[String]) -> Vec<String> {
    list.iter().map(|m| normalize_member(m)).collect()
}

fn param_block(label: &str, list: &[String]) -> String {
    let mut block = format!("{label}:");
    for item in list {
        block.push_str("\n  ");
        block.push_str(item);
    }
    block
}

fn operands(req: &OperationRequest, operand: String) -> Operands {
    Operands {
        operand,
        members: normalized(&req.p0),
        principals: normalized(&req.p1),
        force_flag: false,
    }
}

// ── Checks ──────────────────────────────────────────────────────────

/// Operand present and legal. With `strict`, `p0` and `p1` must be empty.
pub fn operand_only(
    kind: OperationKind,
    req: &OperationRequest,
    strict: bool,
) -> Result<Operands, ZoneError> {
    let operand = match req.operand.as_deref().map(str::trim) {
        Some(o) if !o.is_empty() => o.to_owned(),
        _ => return Err(ZoneError::bad_request("Missing operand", Vec::new())),
    };

    if kind == OperationKind::Defzone {
        if !DEFZONE_OPTIONS.contains(&operand.as_str()) {
            return Err(ZoneError::bad_request(
                "Invalid option for defzone",
                vec![operand],
            ));
        }
    } else if !is_valid_zone_name(&operand) {
        return Err(ZoneError::bad_request(
            "Invalid zone object name",
            vec![operand],
        ));
    }

    if strict && !(req.p0.is_empty() && req.p1.is_empty()) {
        let mut detail = Vec::new();
        if !req.p0.is_empty() {
            detail.push(param_block("p0", &req.p0));
        }
        if !req.p1.is_empty() {
            detail.push(param_block("p1", &req.p1));
        }
        return Err(ZoneError::bad_request("Unsupported parameters", detail));
    }

    Ok(operands(req, operand))
}

/// Operand plus at least one member in `p0`. With `strict`, `p1` must be
/// empty.
pub fn with_members(
    kind: OperationKind,
    req: &OperationRequest,
    strict: bool,
) -> Result<Operands, ZoneError> {
    let ops = operand_only(kind, req, false)?;
    if req.p0.is_empty() {
        return Err(ZoneError::bad_request(
            format!("{kind} missing members"),
            vec!["p0".into()],
        ));
    }
    if strict && !req.p1.is_empty() {
        return Err(ZoneError::bad_request(
            format!("{kind} has unsupported parameters (p1)"),
            req.p1.clone(),
        ));
    }
    Ok(ops)
}

/// Operand plus at least one principal member in `p1`. With `strict`,
/// `p0` must be empty.
pub fn with_principals(
    kind: OperationKind,
    req: &OperationRequest,
    strict: bool,
) -> Result<Operands, ZoneError> {
    let ops = operand_only(kind, req, false)?;
    if req.p1.is_empty() {
        return Err(ZoneError::bad_request(
            format!("{kind} missing members"),
            vec!["principal members: p1".into()],
        ));
    }
    if strict && !req.p0.is_empty() {
        return Err(ZoneError::bad_request(
            format!("{kind} has unsupported parameters"),
            vec![param_block("p0", &req.p0)],
        ));
    }
    Ok(ops)
}

/// Operand plus members in `p0`, `p1`, or both.
pub fn with_either(
    kind: OperationKind,
    req: &OperationRequest,
    strict: bool,
) -> Result<Operands, ZoneError> {
    let ops = operand_only(kind, req, false)?;
    if req.p0.is_empty() && req.p1.is_empty() {
        return Err(if strict {
            ZoneError::bad_request(
                format!("{kind} missing members"),
                vec!["members: p0".into(), "principal members: p1".into()],
            )
        } else {
            ZoneError::bad_request(format!("{kind} requires p0 or p1"), Vec::new())
        });
    }
    Ok(ops)
}

/// Operand plus an optional lone force token in `p0`. Anything else in
/// `p0` or `p1` is rejected.
pub fn force_flag_only(
    kind: OperationKind,
    req: &OperationRequest,
) -> Result<Operands, ZoneError> {
    let mut ops = operand_only(kind, req, false)?;
    let lone_flag = match req.p0.as_slice() {
        [flag] => req.p1.is_empty() && FORCE_FLAGS.contains(&flag.as_str()),
        _ => false,
    };
    if lone_flag {
        ops.force_flag = true;
        ops.members.clear();
        return Ok(ops);
    }
    if !(req.p0.is_empty() && req.p1.is_empty()) {
        let detail = req.p0.iter().chain(&req.p1).cloned().collect();
        return Err(ZoneError::bad_request(
            format!("{kind} has unsupported parameters"),
            detail,
        ));
    }
    Ok(ops)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn req(kind: OperationKind, operand: &str) -> OperationRequest {
        OperationRequest::new(kind, operand)
    }

    #[test]
    fn missing_operand() {
        let mut r = req(OperationKind::AliasDelete, "");
        let err = operand_only(OperationKind::AliasDelete, &r, true).unwrap_err();
        assert_eq!(err.reason, "Missing operand");
        assert_eq!(err.status(), 400);

        r.operand = None;
        assert!(operand_only(OperationKind::AliasDelete, &r, true).is_err());
    }

    #[test]
    fn invalid_name_reports_operand() {
        let r = req(OperationKind::AliasAdd, "bad name!").members(["1,4"]);
        let err = with_members(OperationKind::AliasAdd, &r, true).unwrap_err();
        assert_eq!(err.reason, "Invalid zone object name");
        assert_eq!(err.detail, ["bad name!"]);
    }

    #[test]
    fn defzone_options() {
        let ok = req(OperationKind::Defzone, "--allaccess");
        assert_eq!(
            operand_only(OperationKind::Defzone, &ok, true).unwrap().operand,
            "--allaccess"
        );
        let bad = req(OperationKind::Defzone, "--everyone");
        let err = operand_only(OperationKind::Defzone, &bad, true).unwrap_err();
        assert_eq!(err.reason, "Invalid option for defzone");
        assert_eq!(err.detail, ["--everyone"]);
    }

    #[test]
    fn strict_operand_lists_extra_parameters() {
        let r = req(OperationKind::ZoneDelete, "z1").members(["a", "b"]);
        let err = operand_only(OperationKind::ZoneDelete, &r, true).unwrap_err();
        assert_eq!(err.reason, "Unsupported parameters");
        assert_eq!(err.detail, ["p0:\n  a\n  b"]);
    }

    #[test]
    fn members_check() {
        let empty = req(OperationKind::AliasCreate, "h1");
        let err = with_members(OperationKind::AliasCreate, &empty, true).unwrap_err();
        assert_eq!(err.reason, "alias-create missing members");
        assert_eq!(err.detail, ["p0"]);

        let extra = req(OperationKind::AliasCreate, "h1")
            .members(["1,1"])
            .principals(["1,2"]);
        let err = with_members(OperationKind::AliasCreate, &extra, true).unwrap_err();
        assert_eq!(err.reason, "alias-create has unsupported parameters (p1)");
        assert_eq!(err.detail, ["1,2"]);

        let ok = req(OperationKind::AliasCreate, "h1").members(["10:00:00:00:00:00:00:0A"]);
        let ops = with_members(OperationKind::AliasCreate, &ok, true).unwrap();
        assert_eq!(ops.members, ["10:00:00:00:00:00:00:0a"]);
    }

    #[test]
    fn principals_check() {
        let empty = req(OperationKind::ZoneCreate, "pz").peer(true);
        let err = with_principals(OperationKind::ZoneCreate, &empty, false).unwrap_err();
        assert_eq!(err.detail, ["principal members: p1"]);

        let extra = req(OperationKind::ZoneCreate, "pz")
            .members(["h1"])
            .principals(["a1"]);
        assert!(with_principals(OperationKind::ZoneCreate, &extra, false).is_ok());
        let err = with_principals(OperationKind::ZoneCreate, &extra, true).unwrap_err();
        assert_eq!(err.detail, ["p0:\n  h1"]);
    }

    #[test]
    fn either_check() {
        let empty = req(OperationKind::ZoneAdd, "z1");
        let err = with_either(OperationKind::ZoneAdd, &empty, false).unwrap_err();
        assert_eq!(err.reason, "zone-add requires p0 or p1");
        let err = with_either(OperationKind::ZoneAdd, &empty, true).unwrap_err();
        assert_eq!(err.detail, ["members: p0", "principal members: p1"]);

        let principals = req(OperationKind::ZoneAdd, "z1").principals(["a1"]);
        assert!(with_either(OperationKind::ZoneAdd, &principals, false).is_ok());
    }

    #[test]
    fn force_flag() {
        let plain = req(OperationKind::CfgEnable, "prod");
        assert!(!force_flag_only(OperationKind::CfgEnable, &plain).unwrap().force_flag);

        let forced = req(OperationKind::CfgEnable, "prod").members(["-force"]);
        let ops = force_flag_only(OperationKind::CfgEnable, &forced).unwrap();
        assert!(ops.force_flag);
        assert!(ops.members.is_empty());

        let junk = req(OperationKind::CfgEnable, "prod").members(["-x"]).principals(["y"]);
        let err = force_flag_only(OperationKind::CfgEnable, &junk).unwrap_err();
        assert_eq!(err.reason, "cfg-enable has unsupported parameters");
        assert_eq!(err.detail, ["-x", "y"]);
    }
}
