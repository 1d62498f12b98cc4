use town_protocol::TicketBoothItem;

/// Items sold by a ticket booth when no custom catalog is configured.
pub fn default_catalog() -> Vec<TicketBoothItem> {
    [("Party Hat", 5), ("Sunglasses", 10), ("Crown", 25)]
        .into_iter()
        .map(|(name, cost)| TicketBoothItem {
            name: name.to_string(),
            cost,
        })
        .collect()
}
