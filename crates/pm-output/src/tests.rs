//! Integration tests for pm-output.

use pm_core::{ActType, Event, LinkId, PersonId, SimTime};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn end(t: f64, person: &str, act: &str) -> Event {
    Event::activity_end(SimTime(t), PersonId::new(person), LinkId::new("l1"), ActType::new(act))
}

fn start(t: f64, person: &str, act: &str) -> Event {
    Event::activity_start(SimTime(t), PersonId::new(person), LinkId::new("l2"), ActType::new(act))
}

fn sample() -> Vec<Event> {
    vec![end(21600.0, "1", "home"), start(21600.0, "1", "work")]
}

#[cfg(test)]
mod xml_tests {
    use super::*;
    use crate::sink::EventSink;
    use crate::xml::{XmlSink, escape};

    fn render(events: &[Event]) -> String {
        let mut sink = XmlSink::new(Vec::new());
        for e in events {
            sink.write_event(e).unwrap();
        }
        sink.finish().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn document_layout() {
        assert_eq!(
            render(&sample()),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <events version=\"1.0\">\n\
             \x20 <event time=\"21600\" type=\"actEnd\" person=\"1\" link=\"l1\" actType=\"home\"/>\n\
             \x20 <event time=\"21600\" type=\"actStart\" person=\"1\" link=\"l2\" actType=\"work\"/>\n\
             </events>\n"
        );
    }

    #[test]
    fn empty_run_is_still_a_document() {
        assert_eq!(
            render(&[]),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<events version=\"1.0\">\n</events>\n"
        );
    }

    #[test]
    fn fractional_times_keep_their_digits() {
        let out = render(&[end(3600.5, "1", "home")]);
        assert!(out.contains("time=\"3600.5\""));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut sink = XmlSink::new(Vec::new());
        sink.finish().unwrap();
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.matches("</events>").count(), 1);
    }

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&apos;");

        let out = render(&[end(0.0, "o'neil & co", "home")]);
        assert!(out.contains("person=\"o&apos;neil &amp; co\""));
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvSink;
    use crate::sink::EventSink;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn header_and_rows() {
        let dir = tmp();
        let path = dir.path().join("events.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        for e in sample() {
            sink.write_event(&e).unwrap();
        }
        sink.finish().unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["time", "type", "person", "link", "actType"]);

        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "21600");
        assert_eq!(&rows[0][1], "actEnd");
        assert_eq!(&rows[1][1], "actStart");
        assert_eq!(&rows[1][4], "work");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut sink = CsvSink::create(&dir.path().join("e.csv")).unwrap();
        sink.finish().unwrap();
        sink.finish().unwrap();
    }
}

#[cfg(test)]
mod jsonl_tests {
    use super::*;
    use crate::jsonl::JsonLinesSink;
    use crate::sink::EventSink;

    #[test]
    fn one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        for e in sample() {
            sink.write_event(&e).unwrap();
        }
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["time"], 21600.0);
        assert_eq!(first["type"], "actEnd");
        assert_eq!(first["person"], "1");
        assert_eq!(first["actType"], "home");

        let back: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, sample()[1]);
    }
}

#[cfg(test)]
mod kind_tests {
    use std::path::Path;

    use super::*;
    use crate::{OutputError, SinkKind, open_sink};

    #[test]
    fn parse_names() {
        assert_eq!("xml".parse::<SinkKind>().unwrap(), SinkKind::Xml);
        assert_eq!("CSV".parse::<SinkKind>().unwrap(), SinkKind::Csv);
        assert_eq!("jsonl".parse::<SinkKind>().unwrap(), SinkKind::JsonLines);
        assert_eq!("db".parse::<SinkKind>().unwrap(), SinkKind::Sqlite);
        assert!(matches!("yaml".parse::<SinkKind>(), Err(OutputError::UnknownFormat(_))));
    }

    #[test]
    fn guesses_from_extension() {
        assert_eq!(SinkKind::from_extension(Path::new("out/events.csv")), Some(SinkKind::Csv));
        assert_eq!(SinkKind::from_extension(Path::new("events.jsonl")), Some(SinkKind::JsonLines));
        assert_eq!(SinkKind::from_extension(Path::new("events")), None);
        assert_eq!(SinkKind::from_extension(Path::new("events.gz")), None);
    }

    #[test]
    fn sqlite_needs_a_path() {
        assert!(matches!(
            open_sink(SinkKind::Sqlite, None),
            Err(OutputError::PathRequired(SinkKind::Sqlite))
        ));
    }

    #[test]
    fn opened_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.xml");
        let mut sink = open_sink(SinkKind::Xml, Some(&path)).unwrap();
        for e in sample() {
            sink.write_event(&e).unwrap();
        }
        sink.finish().unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("<event ").count(), 2);
        assert!(text.ends_with("</events>\n"));
    }
}

#[cfg(test)]
mod drain_tests {
    use std::thread;
    use std::time::Duration;

    use pm_core::MergeConfig;
    use pm_merge::{CancelSource, CancelToken, Interrupt, MergePipeline, event_channel, spawn_producer};
    use pm_plan::{Activity, Plan, simulate};

    use super::*;
    use crate::{MemorySink, OutputError, XmlSink, drain_into};

    #[test]
    fn drains_until_close_and_finishes() {
        let (tx, rx) = event_channel();
        let producer = spawn_producer("p", sample().into_iter(), tx, CancelToken::never()).unwrap();

        let mut sink = MemorySink::new();
        let report = drain_into(rx, &mut sink, &CancelToken::never()).unwrap();
        producer.join().unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.first_time, Some(SimTime(21600.0)));
        assert_eq!(report.last_time, Some(SimTime(21600.0)));
        assert!(sink.is_finished());
        assert_eq!(sink.events(), sample().as_slice());
    }

    #[test]
    fn cancellation_interrupts_waiting_sink() {
        let source = CancelSource::new();
        let token = source.token();
        let (_silent, rx) = event_channel();

        let waiter = thread::spawn(move || {
            let mut sink = MemorySink::new();
            drain_into(rx, &mut sink, &token).map(|_| sink.is_finished())
        });
        thread::sleep(Duration::from_millis(20));
        source.cancel();

        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(OutputError::Interrupted(Interrupt::Cancelled))));
    }

    #[test]
    fn merged_plans_render_as_xml() {
        let home_work_home = Plan::new(vec![
            Activity::new("home", "l1").with_end_time("06:00"),
            Activity::new("work", "l2").with_dur("08:00"),
            Activity::new("home", "l1"),
        ]);
        let late_riser = Plan::new(vec![
            Activity::new("home", "l3").with_end_time("07:00"),
            Activity::new("shop", "l4").with_dur("00:30"),
        ]);
        let sources = vec![
            simulate(home_work_home, PersonId::new("a")),
            simulate(late_riser, PersonId::new("b")),
        ];

        let cancel = CancelToken::never();
        let report = MergePipeline::new(MergeConfig::default())
            .run(sources, |merged| {
                let mut sink = XmlSink::new(Vec::new());
                drain_into(merged, &mut sink, &cancel).map(|r| (r, sink.into_inner()))
            })
            .unwrap();

        let (sink_report, bytes) = report.sink.unwrap();
        assert_eq!(sink_report.written, 6);

        let text = String::from_utf8(bytes).unwrap();
        let events: Vec<&str> = text.lines().filter(|l| l.contains("<event ")).collect();
        assert_eq!(
            events,
            [
                "  <event time=\"21600\" type=\"actEnd\" person=\"a\" link=\"l1\" actType=\"home\"/>",
                "  <event time=\"21600\" type=\"actStart\" person=\"a\" link=\"l2\" actType=\"work\"/>",
                "  <event time=\"25200\" type=\"actEnd\" person=\"b\" link=\"l3\" actType=\"home\"/>",
                "  <event time=\"25200\" type=\"actStart\" person=\"b\" link=\"l4\" actType=\"shop\"/>",
                "  <event time=\"50400\" type=\"actEnd\" person=\"a\" link=\"l2\" actType=\"work\"/>",
                "  <event time=\"50400\" type=\"actStart\" person=\"a\" link=\"l1\" actType=\"home\"/>",
            ]
        );
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use rusqlite::Connection;

    use super::*;
    use crate::sink::EventSink;
    use crate::sqlite::SqliteSink;

    #[test]
    fn events_table_in_stream_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let mut sink = SqliteSink::open(&path).unwrap();
        for e in sample() {
            sink.write_event(&e).unwrap();
        }
        sink.finish().unwrap();
        sink.finish().unwrap();
        drop(sink);

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn.prepare("SELECT seq, type, act_type FROM events ORDER BY seq").unwrap();
        let rows: Vec<(i64, String, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            rows,
            [
                (0, "actEnd".to_owned(), "home".to_owned()),
                (1, "actStart".to_owned(), "work".to_owned()),
            ]
        );
    }
}
