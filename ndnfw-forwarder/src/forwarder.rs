//! The classical forwarder: PIT aggregation, nonce dedupe, Dead-Nonce
//! list, Unsatisfy/Straggler timers, matching NFD's `Forwarder` pipeline.

use crate::config::{ForwarderConfig, UnsolicitedDataPolicy};
use crate::face::FaceTable;
use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;
use crate::table::cs::ContentStore;
use crate::table::dead_nonce::DeadNonceList;
use crate::table::fib::Fib;
use crate::table::pit::{DuplicateNonceWhere, Pit, PitEntry};
use crate::table::strategy_choice::StrategyChoiceTable;
use crate::DelayCallback;
use log::{debug, trace, warn};
use ndnfw_common::metrics::UdcnMetrics;
use ndnfw_common::ndn::{Data, FaceId, Interest, Name, FACEID_CONTENT_STORE, LOCALHOST_NAME};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

pub struct Forwarder {
    self_ref: Weak<Forwarder>,
    faces: FaceTable,
    fib: RefCell<Fib>,
    cs: RefCell<ContentStore>,
    pit: Pit,
    dead_nonce: RefCell<DeadNonceList>,
    strategy_choice: StrategyChoiceTable<dyn Strategy>,
    config: ForwarderConfig,
    metrics: Rc<UdcnMetrics>,
    interest_delay_callback: RefCell<Option<DelayCallback>>,
    content_delay_callback: RefCell<Option<DelayCallback>>,
}

impl Forwarder {
    pub fn new(
        config: ForwarderConfig,
        metrics: Rc<UdcnMetrics>,
        registry: &StrategyRegistry,
    ) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| {
            let strategy_choice = StrategyChoiceTable::new();
            registry.install_strategies(&strategy_choice);
            Self {
                self_ref: self_ref.clone(),
                faces: FaceTable::new(),
                fib: RefCell::new(Fib::new()),
                cs: RefCell::new(ContentStore::new(config.cs_capacity)),
                pit: Pit::new(),
                dead_nonce: RefCell::new(DeadNonceList::new(config.dead_nonce_retention)),
                strategy_choice,
                metrics,
                config,
                interest_delay_callback: RefCell::new(None),
                content_delay_callback: RefCell::new(None),
            }
        })
    }

    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    pub fn fib(&self) -> &RefCell<Fib> {
        &self.fib
    }

    pub fn pit(&self) -> &Pit {
        &self.pit
    }

    pub fn metrics(&self) -> &UdcnMetrics {
        &self.metrics
    }

    pub fn set_interest_delay_callback(&self, cb: DelayCallback) {
        *self.interest_delay_callback.borrow_mut() = Some(cb);
    }

    pub fn set_content_delay_callback(&self, cb: DelayCallback) {
        *self.content_delay_callback.borrow_mut() = Some(cb);
    }

    fn fire_interest_delay(&self, face: FaceId, start: Instant) {
        if let Some(cb) = self.interest_delay_callback.borrow().as_ref() {
            cb(face, Instant::now(), start.elapsed());
        }
    }

    fn fire_content_delay(&self, face: FaceId, start: Instant) {
        if let Some(cb) = self.content_delay_callback.borrow().as_ref() {
            cb(face, Instant::now(), start.elapsed());
        }
    }

    /// Outgoing Interest pipeline. When `want_new_nonce` is set, a fresh
    /// uniform nonce is minted before the Interest leaves the core.
    pub fn send_interest(&self, out_face: FaceId, mut interest: Interest, want_new_nonce: bool) {
        if !out_face.is_valid() {
            warn!("forwarder: refusing to send Interest to INVALID_FACEID");
            return;
        }
        if want_new_nonce {
            interest.nonce = rand::random();
        }
        match self.faces.get(out_face) {
            Some(face) => {
                self.metrics.n_out_interests.increment();
                face.send_interest(interest);
            }
            None => warn!("forwarder: stale face {} for outgoing Interest", out_face),
        }
    }

    /// Outgoing Data pipeline.
    pub fn send_data(&self, out_face: FaceId, data: Data) {
        if !out_face.is_valid() {
            warn!("forwarder: refusing to send Data to INVALID_FACEID");
            return;
        }
        match self.faces.get(out_face) {
            Some(face) => {
                self.metrics.n_out_datas.increment();
                face.send_data(data);
            }
            None => warn!("forwarder: stale face {} for outgoing Data", out_face),
        }
    }

    /// A strategy found no viable next-hop. The pending InRecord(s) remain;
    /// the Unsatisfy timer governs the entry's eventual fate, same as NFD's
    /// `rejectPendingInterest`.
    pub fn reject_pending_interest(&self, pit_entry: &Rc<RefCell<PitEntry>>) {
        trace!(
            "forwarder: strategy rejected pending interest for {}",
            pit_entry.borrow().name
        );
    }

    /// Incoming Interest pipeline.
    pub fn on_incoming_interest(self: &Rc<Self>, in_face: FaceId, mut interest: Interest) {
        let start = Instant::now();
        interest.incoming_face_id = in_face;
        self.metrics.n_in_interests.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("forwarder: Interest from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local() && Name::from_string(LOCALHOST_NAME).is_prefix_of(&interest.name) {
            debug!(
                "forwarder: scope violation, non-local face {} requested {}",
                in_face, interest.name
            );
            self.metrics.n_scope_violations.increment();
            self.fire_interest_delay(in_face, start);
            return;
        }

        let (entry, _is_new) = self.pit.insert(&interest.name);

        let dup_in_pit = entry.borrow().find_nonce(interest.nonce, in_face);
        let dup_in_dead_nonce = self
            .dead_nonce
            .borrow_mut()
            .has(&interest.name, interest.nonce);
        if dup_in_pit != DuplicateNonceWhere::None || dup_in_dead_nonce {
            debug!(
                "forwarder: duplicate nonce {:#x} for {} from face {}, interest-loop",
                interest.nonce, interest.name, in_face
            );
            self.metrics.n_interest_loop.increment();
            self.on_interest_loop(in_face, &interest);
            self.fire_interest_delay(in_face, start);
            return;
        }

        entry.borrow_mut().cancel_timers();

        if entry.borrow().has_in_records() {
            self.on_content_store_miss(in_face, &entry, interest);
            self.fire_interest_delay(in_face, start);
            return;
        }

        let self_hit = self.clone();
        let entry_hit = entry.clone();
        let in_face_hit = in_face;

        let self_miss = self.clone();
        let entry_miss = entry;
        let in_face_miss = in_face;
        let interest_for_miss = interest.clone();

        self.cs.borrow().find(
            &interest,
            move |data| self_hit.on_content_store_hit(in_face_hit, &entry_hit, data),
            move || self_miss.on_content_store_miss(in_face_miss, &entry_miss, interest_for_miss),
        );

        self.fire_interest_delay(in_face, start);
    }

    fn on_interest_loop(&self, in_face: FaceId, interest: &Interest) {
        // A Nack is emitted by the face collaborator; the core's
        // responsibility ends at not forwarding and not mutating the PIT.
        let _ = (in_face, interest);
    }

    fn on_content_store_hit(
        self: &Rc<Self>,
        in_face: FaceId,
        entry: &Rc<RefCell<PitEntry>>,
        mut data: Data,
    ) {
        if let Some(strategy) = self
            .strategy_choice
            .find_effective_strategy(&entry.borrow().name)
        {
            strategy.before_satisfy_interest(self, Some(entry), FACEID_CONTENT_STORE, &data);
        }
        data.incoming_face_id = FACEID_CONTENT_STORE;
        self.send_data(in_face, data);
    }

    fn on_content_store_miss(
        self: &Rc<Self>,
        in_face: FaceId,
        entry: &Rc<RefCell<PitEntry>>,
        interest: Interest,
    ) {
        let expiry = Instant::now() + Duration::from_millis(interest.lifetime_ms as u64);
        entry.borrow_mut().insert_in_record(in_face, interest.nonce, expiry);
        self.pit.link(entry);

        self.arm_unsatisfy_timer(entry);

        let fib_entry = self.fib.borrow().longest_prefix_match(&interest.name);
        match self
            .strategy_choice
            .find_effective_strategy(&entry.borrow().name)
        {
            Some(strategy) => {
                strategy.after_receive_interest(self, in_face, &interest, &fib_entry, entry)
            }
            None => warn!("forwarder: no effective strategy for {}", interest.name),
        }
    }

    fn arm_unsatisfy_timer(self: &Rc<Self>, entry: &Rc<RefCell<PitEntry>>) {
        let deadline = match entry.borrow().latest_in_record_expiry() {
            Some(d) => d,
            None => return,
        };
        let weak_forwarder = self.self_ref.clone();
        let weak_entry = Rc::downgrade(entry);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if let (Some(forwarder), Some(entry)) = (weak_forwarder.upgrade(), weak_entry.upgrade())
            {
                forwarder.on_interest_unsatisfied(&entry);
            }
        });
        entry.borrow_mut().unsatisfy_timer = Some(handle);
    }

    fn arm_straggler_timer(self: &Rc<Self>, entry: &Rc<RefCell<PitEntry>>) {
        entry.borrow_mut().cancel_timers();
        let weak_forwarder = self.self_ref.clone();
        let weak_entry = Rc::downgrade(entry);
        let timeout = self.config.straggler_timeout;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(timeout).await;
            if let (Some(forwarder), Some(entry)) = (weak_forwarder.upgrade(), weak_entry.upgrade())
            {
                forwarder.on_interest_finalize(&entry, true);
            }
        });
        entry.borrow_mut().straggler_timer = Some(handle);
    }

    /// `UnsatisfyTimer` fired. Mirrors NFD's `beforeExpirePendingInterest`
    /// -> `onInterestFinalize(entry, false)`.
    fn on_interest_unsatisfied(self: &Rc<Self>, entry: &Rc<RefCell<PitEntry>>) {
        self.metrics.n_interests_unsatisfied.increment();
        debug!("forwarder: Interest {} unsatisfied", entry.borrow().name);
        self.on_interest_finalize(entry, false);
    }

    /// `StragglerTimer` fired, or called directly above. A finalized,
    /// already-dropped entry can't reach here: this only runs while the
    /// caller still holds a strong `Rc` to it.
    fn on_interest_finalize(&self, entry: &Rc<RefCell<PitEntry>>, is_satisfied: bool) {
        let name = entry.borrow().name.clone();
        trace!(
            "forwarder: finalizing PIT entry {} (satisfied={})",
            name,
            is_satisfied
        );
        entry.borrow_mut().cancel_timers();

        let mut dead_nonce = self.dead_nonce.borrow_mut();
        let e = entry.borrow();
        if !e.out_records.is_empty() {
            for r in &e.out_records {
                dead_nonce.add(name.clone(), r.nonce);
            }
        } else {
            for r in &e.in_records {
                dead_nonce.add(name.clone(), r.nonce);
            }
        }
        drop(e);
        drop(dead_nonce);

        self.pit.erase(&name);
    }

    /// Incoming Data pipeline.
    pub fn on_incoming_data(self: &Rc<Self>, in_face: FaceId, mut data: Data) {
        let start = Instant::now();
        self.metrics.n_in_datas.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("forwarder: Data from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local() && Name::from_string(LOCALHOST_NAME).is_prefix_of(&data.name) {
            debug!(
                "forwarder: scope violation, non-local face {} sent Data under {}",
                in_face, data.name
            );
            self.fire_content_delay(in_face, start);
            return;
        }

        data.incoming_face_id = in_face;
        let matches = self.pit.find_all_data_matches(&data);

        if matches.is_empty() {
            debug!("forwarder: unsolicited Data {}", data.name);
            self.metrics.n_data_unsolicited.increment();
            if self.config.unsolicited_data_policy == UnsolicitedDataPolicy::CacheAnyway {
                self.cs.borrow_mut().insert(data.stripped_for_cs());
            }
            self.fire_content_delay(in_face, start);
            return;
        }

        self.cs.borrow_mut().insert(data.stripped_for_cs());

        for entry in &matches {
            if let Some(strategy) = self
                .strategy_choice
                .find_effective_strategy(&entry.borrow().name)
            {
                strategy.before_satisfy_interest(self, Some(entry), in_face, &data);
            }

            let satisfy_faces: Vec<FaceId> = entry
                .borrow()
                .in_records
                .iter()
                .map(|r| r.face)
                .filter(|&f| f != in_face)
                .collect();

            for out_face in satisfy_faces {
                self.send_data(out_face, data.clone());
            }

            self.metrics.n_interests_satisfied.increment();
            self.arm_straggler_timer(entry);
        }

        self.fire_content_delay(in_face, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;
    use bytes::Bytes;
    use ndnfw_common::metrics::UdcnMetrics;
    use std::cell::RefCell as StdRefCell;

    #[derive(Debug)]
    struct RecordingFace {
        id: FaceId,
        sent_interests: StdRefCell<Vec<Interest>>,
        sent_data: StdRefCell<Vec<Data>>,
    }

    impl RecordingFace {
        fn new(id: u64) -> Rc<Self> {
            Rc::new(Self {
                id: FaceId(id),
                sent_interests: StdRefCell::new(Vec::new()),
                sent_data: StdRefCell::new(Vec::new()),
            })
        }
    }

    impl Face for RecordingFace {
        fn id(&self) -> FaceId {
            self.id
        }
        fn send_interest(&self, interest: Interest) {
            self.sent_interests.borrow_mut().push(interest);
        }
        fn send_data(&self, data: Data) {
            self.sent_data.borrow_mut().push(data);
        }
    }

    fn make_forwarder() -> Rc<Forwarder> {
        let registry = StrategyRegistry::with_default_strategies();
        Forwarder::new(
            ForwarderConfig::default(),
            Rc::new(UdcnMetrics::new()),
            &registry,
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn s1_interest_forwarded_and_pit_created() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_forwarder();
                let face1 = RecordingFace::new(1);
                let face2 = RecordingFace::new(2);
                fwd.faces().insert(face1.clone());
                fwd.faces().insert(face2.clone());
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/a"),
                    vec![crate::table::fib::NextHop {
                        face: FaceId(2),
                        cost: 1,
                    }],
                );

                let interest = Interest::new(Name::from_string("/a/1")).with_nonce(0xDEAD);
                fwd.on_incoming_interest(FaceId(1), interest);

                assert_eq!(face2.sent_interests.borrow().len(), 1);
                assert_eq!(face2.sent_interests.borrow()[0].nonce, 0xDEAD);
                assert_eq!(fwd.pit().len(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn s2_same_face_same_nonce_is_a_refresh_not_a_loop() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_forwarder();
                let face1 = RecordingFace::new(1);
                let face2 = RecordingFace::new(2);
                fwd.faces().insert(face1.clone());
                fwd.faces().insert(face2.clone());
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/a"),
                    vec![crate::table::fib::NextHop {
                        face: FaceId(2),
                        cost: 1,
                    }],
                );

                let interest = Interest::new(Name::from_string("/a/1")).with_nonce(0xDEAD);
                fwd.on_incoming_interest(FaceId(1), interest.clone());
                fwd.on_incoming_interest(FaceId(1), interest);

                assert_eq!(fwd.metrics().n_interest_loop.value(), 0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn s3_duplicate_nonce_from_other_face_triggers_interest_loop() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_forwarder();
                let face1 = RecordingFace::new(1);
                let face2 = RecordingFace::new(2);
                let face3 = RecordingFace::new(3);
                fwd.faces().insert(face1);
                fwd.faces().insert(face2.clone());
                fwd.faces().insert(face3);
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/a"),
                    vec![crate::table::fib::NextHop {
                        face: FaceId(2),
                        cost: 1,
                    }],
                );

                let interest = Interest::new(Name::from_string("/a/1")).with_nonce(0xDEAD);
                fwd.on_incoming_interest(FaceId(1), interest.clone());
                fwd.on_incoming_interest(FaceId(3), interest);

                assert_eq!(fwd.metrics().n_interest_loop.value(), 1);
                assert_eq!(face2.sent_interests.borrow().len(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn s4_data_satisfies_pending_interest() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_forwarder();
                let face1 = RecordingFace::new(1);
                let face2 = RecordingFace::new(2);
                fwd.faces().insert(face1.clone());
                fwd.faces().insert(face2.clone());
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/a"),
                    vec![crate::table::fib::NextHop {
                        face: FaceId(2),
                        cost: 1,
                    }],
                );

                let interest = Interest::new(Name::from_string("/a/1")).with_nonce(0xDEAD);
                fwd.on_incoming_interest(FaceId(1), interest);

                let data = Data::new(Name::from_string("/a/1"), Bytes::from_static(b"hello"));
                fwd.on_incoming_data(FaceId(2), data);

                assert_eq!(face1.sent_data.borrow().len(), 1);
                assert_eq!(fwd.metrics().n_interests_satisfied.value(), 1);
            })
            .await;
    }
}
