//! Built-in chart shown on first run.

use crate::model::{ChartData, Connection, Entity, EntityKind};
use kurbo::Point;

/// Four entities and three connections: two owners of Acme and one
/// subsidiary.
pub fn sample_chart() -> ChartData {
    ChartData {
        entities: vec![
            Entity::new("1", "Acme Corporation", "AC001", EntityKind::Company, Point::new(400.0, 300.0)),
            Entity::new("2", "John Smith", "JS001", EntityKind::Person, Point::new(200.0, 150.0)),
            Entity::new("3", "Tech Holdings LLC", "TH001", EntityKind::Company, Point::new(600.0, 150.0)),
            Entity::new("4", "Innovation Labs", "IL001", EntityKind::Company, Point::new(400.0, 450.0)),
        ],
        connections: vec![
            Connection::new("conn1", "2", "1", 60.0),
            Connection::new("conn2", "3", "1", 40.0),
            Connection::new("conn3", "1", "4", 100.0),
        ],
    }
}
