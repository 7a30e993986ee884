//! Tests for grammar priority and dialect detection

use crate::characteristics::CharacteristicTable;
use crate::models::Dialect;
use crate::parser::{
    BoschGrammar, GrammarMatch, LineGrammar, MeasurementLineParser, MessdateGrammar,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Grammar wrapper counting how often it is consulted
#[derive(Debug)]
struct CountingGrammar<G> {
    inner: G,
    calls: Arc<AtomicUsize>,
}

impl<G: LineGrammar> LineGrammar for CountingGrammar<G> {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn try_match<'a>(&self, line: &'a str) -> Vec<GrammarMatch<'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.try_match(line)
    }
}

fn counting_parser() -> (MeasurementLineParser, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let messdate_calls = Arc::new(AtomicUsize::new(0));
    let bosch_calls = Arc::new(AtomicUsize::new(0));
    let parser = MeasurementLineParser::with_grammars(vec![
        Box::new(CountingGrammar {
            inner: MessdateGrammar,
            calls: Arc::clone(&messdate_calls),
        }),
        Box::new(CountingGrammar {
            inner: BoschGrammar,
            calls: Arc::clone(&bosch_calls),
        }),
    ]);
    (parser, messdate_calls, bosch_calls)
}

#[test]
fn test_bosch_not_consulted_when_messdate_matches() {
    let (parser, messdate_calls, bosch_calls) = counting_parser();
    let table = CharacteristicTable::new();

    let (set, _) = parser.parse_lines(
        [
            "57.962 0 5.7.2006/10:48:7 26.051 0 5.7.2006/10:48:7",
            "57.963 0 5.7.2006/10:48:8",
        ],
        &table,
    );

    assert_eq!(set.len(), 3);
    assert_eq!(messdate_calls.load(Ordering::SeqCst), 2);
    assert_eq!(bosch_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_bosch_consulted_after_messdate_miss() {
    let (parser, messdate_calls, bosch_calls) = counting_parser();
    let mut table = CharacteristicTable::new();
    table.set_field(1, "K2002", "Bore");

    let (set, stats) = parser.parse_lines(["6.00100000000000E+00\u{14}0\u{14}06.09.2002/12:41:27\u{14}#0000"], &table);

    assert_eq!(messdate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(bosch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(set.len(), 1);

    let record = &set.records()[0];
    assert_eq!(record.dialect, Dialect::Bosch);
    assert_eq!(record.value, 6.001);
    assert_eq!(record.attribute, 0);
    assert_eq!(record.timestamp.canonical(), "2002-09-06 12:41:27");
    assert_eq!(record.characteristic, "Bore");
    assert_eq!(stats.bosch_lines, 1);
}

#[test]
fn test_unmatched_line_consults_every_grammar() {
    let (parser, messdate_calls, bosch_calls) = counting_parser();
    let table = CharacteristicTable::new();

    let (set, stats) = parser.parse_lines(["50.450 24.550 67.029 0.021 7.499"], &table);

    assert!(set.is_empty());
    assert_eq!(messdate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(bosch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.lines_unmatched, 1);
}

#[test]
fn test_mixed_dialect_session() {
    let parser = MeasurementLineParser::new();
    let table = CharacteristicTable::new();

    let (set, stats) = parser.parse_lines(
        [
            "57.962 0 5.7.2006/10:48:7",
            "6.001E+00 0 06.09.2002/12:41:27 #0000 -1.25E-01 0 06.09.2002/12:41:27 #0000",
        ],
        &table,
    );

    assert_eq!(set.len(), 3);
    assert!(stats.is_mixed());
    let dialects: Vec<Dialect> = set.iter().map(|r| r.dialect).collect();
    assert_eq!(dialects, vec![Dialect::Messdate, Dialect::Bosch, Dialect::Bosch]);
    assert_eq!(set.records()[2].characteristic_position, 2);
    assert_eq!(set.records()[2].event_id, 2);
}
