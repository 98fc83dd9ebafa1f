use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::route::Route;
use crate::state::{WeatherReading, WeatherScreen};

pub struct CityWeatherProps<'a> {
    pub screen: &'a WeatherScreen,
    pub is_focused: bool,
}

/// The Weather Detail Screen
#[derive(Default)]
pub struct CityWeather;

/// Heading and field lines for a ready reading.
///
/// The temperature is printed as received. The upstream API reports Kelvin
/// unless asked otherwise, so the `°C` label can be wrong.
pub fn reading_lines(city_name: &str, reading: &WeatherReading) -> [String; 4] {
    [
        format!("{city_name} Weather"),
        format!("Temperature: {}°C", reading.temperature),
        format!("Humidity: {}%", reading.humidity),
        format!("Wind Speed: {} m/s", reading.wind_speed),
    ]
}

impl Component<Action> for CityWeather {
    type Props<'a> = CityWeatherProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    Some(Action::Navigate(Route::CityList))
                }
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let lines: Vec<Line> = match props.screen.reading.data() {
            Some(reading) => {
                let [heading, temperature, humidity, wind] =
                    reading_lines(&props.screen.city_name, reading);
                vec![
                    Line::from(Span::styled(heading, Style::default().bold())),
                    Line::default(),
                    Line::from(temperature),
                    Line::from(humidity),
                    Line::from(wind),
                ]
            }
            None => vec![Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        frame.render_widget(Paragraph::new(lines), chunks[0]);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("b", "back"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
