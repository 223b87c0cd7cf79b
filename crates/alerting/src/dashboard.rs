//! Dashboard Event Loop
//!
//! Single-threaded driver for the alert list and its graphs. Remote calls run
//! as local tasks and report back over a channel; controller state is only
//! touched by [`Dashboard::handle`]. Must run inside a
//! [`tokio::task::LocalSet`].

use crate::{
    AlertKey, AlertListController, AlertsFetch, BurnratesFetch, PlotRenderer, Refetch, ResizeBus,
    TimeRange,
};
use objective_service::{ObjectiveService, ServiceError};
use objectives::{GetAlertsResponse, GraphBurnratesResponse, Labels, Objective};
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::debug;

/// A finished remote call
#[derive(Debug)]
pub enum Outcome {
    Alerts {
        generation: u64,
        result: Result<GetAlertsResponse, ServiceError>,
    },
    Burnrates {
        key: AlertKey,
        generation: u64,
        result: Result<GraphBurnratesResponse, ServiceError>,
    },
}

pub struct Dashboard<C> {
    client: Rc<C>,
    list: AlertListController,
    bus: ResizeBus,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    in_flight: usize,
}

impl<C: ObjectiveService + 'static> Dashboard<C> {
    /// Wrap a list controller and issue its first alert fetch
    pub fn start(client: C, mut list: AlertListController, bus: ResizeBus) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let first = list.request_alerts();

        let mut dashboard = Self {
            client: Rc::new(client),
            list,
            bus,
            tx,
            rx,
            in_flight: 0,
        };
        dashboard.dispatch_alerts(first);
        dashboard
    }

    pub fn list(&self) -> &AlertListController {
        &self.list
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Requests issued but not yet handled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn set_objective(&mut self, objective: Objective) {
        if let Some(refetch) = self.list.set_objective(objective) {
            self.dispatch(refetch);
        }
    }

    pub fn set_grouping(&mut self, grouping: Labels) {
        if let Some(refetch) = self.list.set_grouping(grouping) {
            self.dispatch(refetch);
        }
    }

    pub fn set_range(&mut self, range: TimeRange) {
        let fetches = self.list.set_range(range);
        self.dispatch_graphs(fetches);
    }

    /// Container width changed
    pub fn resize(&self, width: u32) {
        self.bus.resize(width);
    }

    fn dispatch(&mut self, refetch: Refetch) {
        self.dispatch_alerts(refetch.alerts);
        self.dispatch_graphs(refetch.graphs);
    }

    fn dispatch_alerts(&mut self, fetch: AlertsFetch) {
        let client = Rc::clone(&self.client);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::task::spawn_local(async move {
            let result = client.get_alerts(fetch.request).await;
            // The receiver lives as long as the dashboard
            let _ = tx.send(Outcome::Alerts {
                generation: fetch.generation,
                result,
            });
        });
    }

    fn dispatch_graphs(&mut self, fetches: Vec<BurnratesFetch>) {
        for BurnratesFetch { key, fetch } in fetches {
            let client = Rc::clone(&self.client);
            let tx = self.tx.clone();
            self.in_flight += 1;

            tokio::task::spawn_local(async move {
                let result = client.graph_burnrates(fetch.request).await;
                let _ = tx.send(Outcome::Burnrates {
                    key,
                    generation: fetch.generation,
                    result,
                });
            });
        }
    }

    /// Apply one finished call, dispatching whatever it makes necessary
    pub fn handle(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Alerts { generation, result } => {
                let fetches = self.list.apply_alerts(generation, result);
                self.dispatch_graphs(fetches);
            }
            Outcome::Burnrates {
                key,
                generation,
                result,
            } => {
                self.list.apply_burnrates(&key, generation, result);
            }
        }
    }

    /// Handle outcomes until no request is outstanding
    pub async fn run_until_idle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(outcome) => self.handle(outcome),
                None => break,
            }
        }
        debug!("Dashboard idle");
    }

    /// Render every visible graph; returns how many were drawn
    pub fn render<R: PlotRenderer>(&self, renderer: &mut R) -> Result<usize, R::Error> {
        let mut drawn = 0;
        for row in self.list.rows() {
            if let Some(frame) = row.graph.frame {
                renderer.render(&frame)?;
                drawn += 1;
            }
        }
        Ok(drawn)
    }
}
