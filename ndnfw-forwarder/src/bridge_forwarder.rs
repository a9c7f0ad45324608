//! The bridge forwarder: a classical, PIT-bearing ingress that rewrites
//! outgoing Interests with a configured `SupportingName` so a PIT-less
//! region downstream can route replies back, per bridge-best-route-strategy.cpp.

use crate::config::ForwarderConfig;
use crate::face::FaceTable;
use crate::registry::StrategyRegistry;
use crate::strategy::pitless_best_route::PitlessBestRoute;
use crate::strategy::{BridgeStrategy, PitlessForwarding, PitlessStrategy};
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

pub struct BridgeForwarder {
    self_ref: Weak<BridgeForwarder>,
    supporting_name: RefCell<Name>,
    faces: FaceTable,
    fib: RefCell<Fib>,
    cs: RefCell<ContentStore>,
    pit: Pit,
    dead_nonce: RefCell<DeadNonceList>,
    bridge_strategy_choice: StrategyChoiceTable<dyn BridgeStrategy>,
    /// The egress-side strategy family. The bridge's own content-store-miss
    /// path never consults this through
    /// `find_effective_strategy`; it always dispatches to
    /// `pitless_fallback_strategy` below, an exact-name lookup. The table
    /// still exists so the registry's install semantics stay uniform across
    /// all three forwarder planes.
    pitless_strategy_choice: StrategyChoiceTable<dyn PitlessStrategy>,
    pitless_fallback_strategy: Name,
    config: ForwarderConfig,
    metrics: Rc<UdcnMetrics>,
    interest_delay_callback: RefCell<Option<DelayCallback>>,
    content_delay_callback: RefCell<Option<DelayCallback>>,
}

impl BridgeForwarder {
    pub fn new(
        supporting_name: Name,
        config: ForwarderConfig,
        metrics: Rc<UdcnMetrics>,
        registry: &StrategyRegistry,
    ) -> Rc<Self> {
        Self::with_pitless_fallback(
            supporting_name,
            PitlessBestRoute::strategy_name(),
            config,
            metrics,
            registry,
        )
    }

    /// As `new`, but with the constant strategy name the bridge pipeline
    /// dispatches into made an explicit parameter rather than a literal.
    /// `pitless-forwarder.cpp` hard-codes this by name; making it
    /// configurable here avoids baking that constant into the pipeline.
    pub fn with_pitless_fallback(
        supporting_name: Name,
        pitless_fallback_strategy: Name,
        config: ForwarderConfig,
        metrics: Rc<UdcnMetrics>,
        registry: &StrategyRegistry,
    ) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| {
            let bridge_strategy_choice = StrategyChoiceTable::new();
            registry.install_bridge_strategies(&bridge_strategy_choice);
            let pitless_strategy_choice = StrategyChoiceTable::new();
            registry.install_pitless_strategies(&pitless_strategy_choice);
            Self {
                self_ref: self_ref.clone(),
                supporting_name: RefCell::new(supporting_name),
                faces: FaceTable::new(),
                fib: RefCell::new(Fib::new()),
                cs: RefCell::new(ContentStore::new(config.cs_capacity)),
                pit: Pit::new(),
                dead_nonce: RefCell::new(DeadNonceList::new(config.dead_nonce_retention)),
                bridge_strategy_choice,
                pitless_strategy_choice,
                pitless_fallback_strategy,
                metrics,
                config,
                interest_delay_callback: RefCell::new(None),
                content_delay_callback: RefCell::new(None),
            }
        })
    }

    pub fn supporting_name(&self) -> Name {
        self.supporting_name.borrow().clone()
    }

    pub fn set_supporting_name(&self, name: Name) {
        *self.supporting_name.borrow_mut() = name;
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

    pub fn bridge_strategy_choice(&self) -> &StrategyChoiceTable<dyn BridgeStrategy> {
        &self.bridge_strategy_choice
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

    pub fn send_interest(&self, out_face: FaceId, mut interest: Interest, want_new_nonce: bool) {
        if !out_face.is_valid() {
            warn!("bridge-forwarder: refusing to send Interest to INVALID_FACEID");
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
            None => warn!("bridge-forwarder: stale face {} for outgoing Interest", out_face),
        }
    }

    pub fn send_data(&self, out_face: FaceId, data: Data) {
        if !out_face.is_valid() {
            warn!("bridge-forwarder: refusing to send Data to INVALID_FACEID");
            return;
        }
        match self.faces.get(out_face) {
            Some(face) => {
                self.metrics.n_out_datas.increment();
                face.send_data(data);
            }
            None => warn!("bridge-forwarder: stale face {} for outgoing Data", out_face),
        }
    }

    pub fn reject_pending_interest(&self, pit_entry: &Rc<RefCell<PitEntry>>) {
        trace!(
            "bridge-forwarder: strategy rejected pending interest for {}",
            pit_entry.borrow().name
        );
    }

    fn pitless_fallback(&self) -> Option<Rc<dyn PitlessStrategy>> {
        self.pitless_strategy_choice
            .get_strategy(&self.pitless_fallback_strategy)
    }

    /// Incoming Interest pipeline: identical to the classical plane through
    /// nonce/duplicate handling; diverges at the Content-Store-miss
    /// dispatch.
    pub fn on_incoming_interest(self: &Rc<Self>, in_face: FaceId, mut interest: Interest) {
        let start = Instant::now();
        interest.incoming_face_id = in_face;
        self.metrics.n_in_interests.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("bridge-forwarder: Interest from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local() && Name::from_string(LOCALHOST_NAME).is_prefix_of(&interest.name) {
            debug!(
                "bridge-forwarder: scope violation, non-local face {} requested {}",
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
                "bridge-forwarder: duplicate nonce {:#x} for {} from face {}, interest-loop",
                interest.nonce, interest.name, in_face
            );
            self.metrics.n_interest_loop.increment();
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

        let self_miss = self.clone();
        let entry_miss = entry;
        let interest_for_miss = interest.clone();

        self.cs.borrow().find(
            &interest,
            move |data| self_hit.on_content_store_hit(in_face, &entry_hit, data),
            move || self_miss.on_content_store_miss(in_face, &entry_miss, interest_for_miss),
        );

        self.fire_interest_delay(in_face, start);
    }

    fn on_content_store_hit(
        self: &Rc<Self>,
        in_face: FaceId,
        _entry: &Rc<RefCell<PitEntry>>,
        mut data: Data,
    ) {
        if let Some(strategy) = self.pitless_fallback() {
            strategy.before_satisfy_interest(&**self, FACEID_CONTENT_STORE, &data);
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
        let rewritten = interest.rewritten_with_supporting_name(self.supporting_name());

        match self.pitless_fallback() {
            Some(strategy) => {
                strategy.after_receive_interest_pitless(&**self, in_face, &rewritten, &fib_entry)
            }
            None => warn!(
                "bridge-forwarder: no installed fallback strategy {}",
                self.pitless_fallback_strategy
            ),
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

    fn on_interest_unsatisfied(self: &Rc<Self>, entry: &Rc<RefCell<PitEntry>>) {
        self.metrics.n_interests_unsatisfied.increment();
        self.on_interest_finalize(entry, false);
    }

    fn on_interest_finalize(&self, entry: &Rc<RefCell<PitEntry>>, is_satisfied: bool) {
        let name = entry.borrow().name.clone();
        trace!(
            "bridge-forwarder: finalizing PIT entry {} (satisfied={})",
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

    /// Incoming Data pipeline: scope-checked against the supporting name
    /// rather than the Data name, forwarded to the first next-hop that
    /// isn't the ingress face.
    pub fn on_incoming_data(self: &Rc<Self>, in_face: FaceId, mut data: Data) {
        let start = Instant::now();
        self.metrics.n_in_datas.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("bridge-forwarder: Data from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local()
            && Name::from_string(LOCALHOST_NAME).is_prefix_of(&data.supporting_name)
        {
            debug!(
                "bridge-forwarder: scope violation on supporting name {} from face {}",
                data.supporting_name, in_face
            );
            self.fire_content_delay(in_face, start);
            return;
        }

        data.incoming_face_id = in_face;
        self.cs.borrow_mut().insert(data.stripped_for_cs());

        let fib_entry = self.fib.borrow().longest_prefix_match(&data.name);
        let candidate = fib_entry
            .next_hops
            .iter()
            .find(|hop| hop.face != in_face && self.faces.contains(hop.face));

        match candidate {
            Some(hop) => self.send_data(hop.face, data),
            None => debug!("bridge-forwarder: no viable egress for Data {}", data.name),
        }

        self.fire_content_delay(in_face, start);
    }
}

impl PitlessForwarding for BridgeForwarder {
    fn faces(&self) -> &FaceTable {
        self.faces()
    }

    fn fib(&self) -> &RefCell<Fib> {
        self.fib()
    }

    fn send_interest(&self, out_face: FaceId, interest: Interest, want_new_nonce: bool) {
        self.send_interest(out_face, interest, want_new_nonce)
    }

    fn send_data(&self, out_face: FaceId, data: Data) {
        self.send_data(out_face, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;
    use crate::table::fib::NextHop;
    use bytes::Bytes;
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

    fn make_bridge() -> Rc<BridgeForwarder> {
        let registry = StrategyRegistry::with_default_strategies();
        BridgeForwarder::new(
            Name::from_string("/bridge/42"),
            ForwarderConfig::default(),
            Rc::new(UdcnMetrics::new()),
            &registry,
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn s7_bridge_rewrites_supporting_name_and_keeps_a_pit() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_bridge();
                let face1 = RecordingFace::new(1);
                let face2 = RecordingFace::new(2);
                fwd.faces().insert(face1.clone());
                fwd.faces().insert(face2.clone());
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/c"),
                    vec![NextHop {
                        face: FaceId(2),
                        cost: 1,
                    }],
                );

                let interest = Interest::new(Name::from_string("/c/y")).with_nonce(7);
                fwd.on_incoming_interest(FaceId(1), interest);

                assert_eq!(face2.sent_interests.borrow().len(), 1);
                let egressed = &face2.sent_interests.borrow()[0];
                assert_eq!(egressed.name, Name::from_string("/c/y"));
                assert_eq!(egressed.supporting_name, Name::from_string("/bridge/42"));
                assert_eq!(egressed.nonce, 7);
                assert_eq!(fwd.pit().len(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn incoming_data_skips_the_ingress_face_and_reaches_the_other_egress() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fwd = make_bridge();
                let face2 = RecordingFace::new(2);
                let face3 = RecordingFace::new(3);
                fwd.faces().insert(face2.clone());
                fwd.faces().insert(face3.clone());
                fwd.fib().borrow_mut().insert(
                    Name::from_string("/c"),
                    vec![
                        NextHop {
                            face: FaceId(2),
                            cost: 1,
                        },
                        NextHop {
                            face: FaceId(3),
                            cost: 1,
                        },
                    ],
                );

                let data = Data::new(Name::from_string("/c/y"), Bytes::from_static(b"hi"))
                    .with_supporting_name(Name::from_string("/bridge/42"));
                fwd.on_incoming_data(FaceId(2), data);

                assert_eq!(face2.sent_data.borrow().len(), 0);
                assert_eq!(face3.sent_data.borrow().len(), 1);
            })
            .await;
    }
}
