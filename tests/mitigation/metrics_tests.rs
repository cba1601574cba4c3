// tests/mitigation/metrics_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::scripted_random::ScriptedRandom;
    use crate::fixtures::test_clock::TestClock;
    use flux_warden::{MitigationConfig, MitigationEngine, SourceHint};

    #[test]
    fn every_request_lands_in_exactly_one_outcome_counter() {
        let config = MitigationConfig::new().capacity(3.0).burst_threshold(4);
        let engine = MitigationEngine::with_config(
            config,
            TestClock::new(0.0),
            ScriptedRandom::constant(0.0),
        )
        .unwrap();

        for _ in 0..8 {
            engine
                .handle_request("a", "GET /", SourceHint::Trusted)
                .unwrap();
        }
        engine
            .handle_request("b", "mal_sig", SourceHint::Untrusted)
            .unwrap();
        engine
            .handle_request("c", "GET /", SourceHint::Trusted)
            .unwrap();
        let _ = engine.handle_request("", "GET /", SourceHint::Trusted);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_requests, 10);
        assert_eq!(metrics.outcomes(), metrics.total_requests);
        assert_eq!(metrics.rejected_invalid, 1);
        assert_eq!(metrics.blocked_signature, 1);
        assert!(metrics.challenges >= metrics.challenges_passed);
    }

    #[test]
    fn signature_hit_is_counted_as_accepted() {
        let engine = MitigationEngine::new(MitigationConfig::default()).unwrap();

        let decision = engine
            .handle_request("192.168.100.1", "POST /exploit - mal_sig", SourceHint::Untrusted)
            .unwrap();
        assert!(decision.admitted);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_requests, 1);
        assert_eq!(metrics.accepted, 1);
        assert_eq!(metrics.blocked_signature, 1);
        assert_eq!(metrics.outcomes(), 1);
    }

    #[test]
    fn counters_follow_a_scripted_client() {
        let config = MitigationConfig::new()
            .capacity(4.0)
            .burst_threshold(4)
            .challenge_pass_rate(0.5)
            .honeypot_sample_rate(0.5);
        // first challenge fails into the honeypot, every later one passes
        let random = ScriptedRandom::new(&[0.9, 0.1], 0.0);
        let engine = MitigationEngine::with_config(config, TestClock::new(0.0), random).unwrap();

        let mut outcomes = Vec::new();
        for _ in 0..7 {
            outcomes.push(
                engine
                    .handle_request("a", "GET /", SourceHint::Trusted)
                    .unwrap()
                    .outcome
                    .as_str(),
            );
        }
        assert_eq!(
            outcomes,
            vec![
                "admitted",
                "admitted",
                "admitted",
                "admitted",
                "redirected_honeypot",
                "blocked_rate_limit",
                "blocked_banned",
            ]
        );

        let metrics = engine.metrics();
        assert_eq!(metrics.accepted, 4);
        assert_eq!(metrics.honeypot_hits, 1);
        assert_eq!(metrics.blocked_rate_limit, 1);
        assert_eq!(metrics.blocked_blacklist, 1);
        assert_eq!(metrics.challenges, 2);
        assert_eq!(metrics.challenges_passed, 1);
    }

    #[test]
    fn report_lists_banned_and_honeypot_keys() {
        let config = MitigationConfig::new()
            .capacity(100.0)
            .burst_threshold(0)
            .perm_ban_threshold(2)
            .challenge_pass_rate(0.5)
            .honeypot_sample_rate(0.5);
        // "trap" fails and is sampled; "bad" passes its challenge
        let random = ScriptedRandom::new(&[0.9, 0.1, 0.1], 0.0);
        let engine = MitigationEngine::with_config(config, TestClock::new(0.0), random).unwrap();

        engine
            .handle_request("trap", "GET /", SourceHint::Trusted)
            .unwrap();
        engine
            .handle_request("bad", "mal_sig", SourceHint::Untrusted)
            .unwrap();

        let report = engine.report();
        assert_eq!(report.permanently_banned, vec!["bad".to_string()]);
        assert_eq!(report.honeypot_observed, vec!["trap".to_string()]);
        assert_eq!(report.metrics.total_requests, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metrics"]["honeypot_hits"], 1);
        assert_eq!(json["permanently_banned"][0], "bad");
    }
}
