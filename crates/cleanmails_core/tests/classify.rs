mod common;

use cleanmails_core::{classify, Classification, Level, Reachable, SmtpSummary, VerificationResult};
use common::{catch_all, deliverable, disposable, unprobed};

const REACHABLE: [Reachable; 3] = [Reachable::Yes, Reachable::No, Reachable::Unknown];
const SMTP: [Option<SmtpSummary>; 3] = [
    None,
    Some(SmtpSummary { catch_all: false }),
    Some(SmtpSummary { catch_all: true }),
];
const LEVELS: [Level; 2] = [Level::One, Level::Two];

fn every_result() -> Vec<VerificationResult> {
    let mut all = Vec::new();
    for reachable in REACHABLE {
        for smtp in SMTP {
            for disposable in [false, true] {
                for has_mx_records in [false, true] {
                    for syntax_valid in [false, true] {
                        all.push(VerificationResult {
                            syntax_valid,
                            has_mx_records,
                            disposable,
                            reachable,
                            smtp,
                            free: false,
                            role_account: false,
                        });
                    }
                }
            }
        }
    }
    all
}

#[test]
fn missing_result_is_indeterminate_at_every_level() {
    for level in LEVELS {
        assert_eq!(classify(None, level), None);
    }
}

#[test]
fn every_present_result_gets_exactly_one_segment() {
    for result in every_result() {
        for level in LEVELS {
            let first = classify(Some(&result), level);
            assert!(first.is_some(), "{result:?} at {level:?}");
            assert_eq!(first, classify(Some(&result), level));
        }
    }
}

#[test]
fn bad_dominates_regardless_of_level_or_catch_all() {
    for result in every_result() {
        let is_bad = result.reachable == Reachable::No
            || result.disposable
            || !result.has_mx_records;
        if !is_bad {
            continue;
        }
        for level in LEVELS {
            assert_eq!(
                classify(Some(&result), level),
                Some(Classification::Bad),
                "{result:?} at {level:?}"
            );
        }
    }
}

#[test]
fn level_one_never_yields_risky() {
    for result in every_result() {
        assert_ne!(
            classify(Some(&result), Level::One),
            Some(Classification::Risky),
            "{result:?}"
        );
    }
}

#[test]
fn level_two_risky_means_unknown_handshake_or_catch_all() {
    for result in every_result() {
        let classification = classify(Some(&result), Level::Two);
        if classification == Some(Classification::Bad) {
            continue;
        }
        let ambiguous = result.reachable == Reachable::Unknown || result.is_catch_all();
        let expected = if ambiguous {
            Classification::Risky
        } else {
            Classification::Good
        };
        assert_eq!(classification, Some(expected), "{result:?}");
    }
}

#[test]
fn catch_all_with_unknown_handshake_depends_on_level() {
    let result = catch_all();
    assert_eq!(classify(Some(&result), Level::Two), Some(Classification::Risky));
    assert_eq!(classify(Some(&result), Level::One), Some(Classification::Good));
}

#[test]
fn disposable_is_bad_even_when_reachable() {
    let result = VerificationResult {
        reachable: Reachable::Yes,
        ..disposable()
    };
    for level in LEVELS {
        assert_eq!(classify(Some(&result), level), Some(Classification::Bad));
    }
}

#[test]
fn syntax_flag_alone_does_not_decide() {
    let result = VerificationResult {
        syntax_valid: false,
        ..deliverable()
    };
    assert_eq!(classify(Some(&result), Level::Two), Some(Classification::Good));
}

#[test]
fn level_one_verdict_without_smtp_is_good() {
    assert_eq!(classify(Some(&unprobed()), Level::One), Some(Classification::Good));
    assert_eq!(classify(Some(&unprobed()), Level::Two), Some(Classification::Risky));
}
