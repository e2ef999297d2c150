use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::repository::{
    VehicleStore,
    entities::{Vehicle, VehicleId},
};

/// Top level navigation tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Vehicles,
    Reports,
    Profile,
}

/// The visible screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Overview,
    VehicleList,
    /// Holds the id only. The record is looked up in the store whenever it is shown.
    VehicleDetail(VehicleId),
    Reports,
    Profile,
}

impl From<Tab> for Screen {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Overview => Screen::Overview,
            Tab::Vehicles => Screen::VehicleList,
            Tab::Reports => Screen::Reports,
            Tab::Profile => Screen::Profile,
        }
    }
}

/// Decides which screen is visible and which vehicle, if any, is selected.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    screen: Screen,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Switch tabs. Any vehicle selection is dropped.
    pub fn select_tab(&mut self, tab: Tab) {
        debug!("Selected tab: {tab}");
        self.screen = tab.into();
    }

    pub fn view_vehicle(&mut self, id: VehicleId) {
        debug!("Viewing vehicle: {id}");
        self.screen = Screen::VehicleDetail(id);
    }

    /// Leave the detail screen for the vehicle list. Does nothing on any other screen.
    pub fn back(&mut self) {
        if matches!(self.screen, Screen::VehicleDetail(_)) {
            self.screen = Screen::VehicleList;
        }
    }

    /// The tab that owns the current screen. The detail screen belongs to [`Tab::Vehicles`].
    pub fn active_tab(&self) -> Tab {
        match self.screen {
            Screen::Overview => Tab::Overview,
            Screen::VehicleList | Screen::VehicleDetail(_) => Tab::Vehicles,
            Screen::Reports => Tab::Reports,
            Screen::Profile => Tab::Profile,
        }
    }

    pub fn selected_id(&self) -> Option<&VehicleId> {
        match &self.screen {
            Screen::VehicleDetail(id) => Some(id),
            _ => None,
        }
    }

    /// The selected vehicle as currently committed in `store`.
    pub fn selected_vehicle<'a>(&self, store: &'a VehicleStore) -> Option<&'a Vehicle> {
        self.selected_id().and_then(|id| store.get(id))
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::repository::entities::{NewVehicle, VehicleStatus};

    #[test]
    fn test_initial_state() {
        let view = ViewController::new();

        assert_eq!(view.screen(), &Screen::Overview);
        assert_eq!(view.active_tab(), Tab::Overview);
        assert_eq!(view.selected_id(), None);
    }

    #[test]
    fn test_back_always_lands_on_list() {
        for tab in Tab::iter() {
            let mut view = ViewController::new();
            view.select_tab(tab);
            view.view_vehicle(VehicleId::from("1"));
            view.back();

            assert_eq!(view.screen(), &Screen::VehicleList);
        }
    }

    #[test]
    fn test_back_elsewhere_is_noop() {
        let mut view = ViewController::new();
        view.select_tab(Tab::Reports);
        view.back();

        assert_eq!(view.screen(), &Screen::Reports);
    }

    #[test]
    fn test_tab_drops_selection() {
        let mut view = ViewController::new();
        view.view_vehicle(VehicleId::from("1"));
        assert_eq!(view.active_tab(), Tab::Vehicles);

        view.select_tab(Tab::Profile);

        assert_eq!(view.screen(), &Screen::Profile);
        assert_eq!(view.selected_id(), None);
    }

    #[test]
    fn test_selection_follows_store() {
        let mut store = VehicleStore::new();
        let vehicle = store.add(NewVehicle::blank(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));

        let mut view = ViewController::new();
        view.view_vehicle(vehicle.id.clone());

        let mut renamed = vehicle.clone();
        renamed.name = "Renamed".into();
        renamed.status = VehicleStatus::Active;
        store.update(renamed.clone()).unwrap();

        assert_eq!(view.selected_vehicle(&store), Some(&renamed));
    }
}
