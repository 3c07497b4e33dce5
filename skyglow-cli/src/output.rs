use chrono::{DateTime, Utc};
use skyglow_core::{
    DayForecast, Forecast, NextSunEvent, SkyQualityScore,
    format::{format_date, format_time},
};

pub fn print_forecast(forecast: &Forecast, now: DateTime<Utc>) {
    println!("Forecast for {} ({})", forecast.coordinate, forecast.timezone);

    if let Some(next) = &forecast.next_event {
        print_next_event(next);
    }

    for day in &forecast.days {
        println!();
        print_day(day, now);
    }
}

pub fn print_next_event(next: &NextSunEvent) {
    if next.is_past() {
        println!(
            "No more sun events today (last {} at {}, {})",
            next.kind,
            next.time,
            score_text(&next.score)
        );
    } else {
        println!(
            "Next {} at {} in {} - {}",
            next.kind,
            next.time,
            next.countdown,
            score_text(&next.score)
        );
    }
}

fn print_day(day: &DayForecast, now: DateTime<Utc>) {
    let w = &day.windows;
    println!("{}", format_date(&day.date));
    println!("  Sunrise {}  {}", format_time(&day.sunrise), score_text(&day.sunrise_score));
    println!(
        "    blue hour   {}-{}   golden hour {}-{}",
        format_time(&w.blue_hour_morning_start),
        format_time(&w.blue_hour_morning_end),
        format_time(&w.golden_hour_morning_start),
        format_time(&w.golden_hour_morning_end),
    );
    println!("  Sunset  {}  {}", format_time(&day.sunset), score_text(&day.sunset_score));
    println!(
        "    golden hour {}-{}   blue hour {}-{}",
        format_time(&w.golden_hour_evening_start),
        format_time(&w.golden_hour_evening_end),
        format_time(&w.blue_hour_evening_start),
        format_time(&w.blue_hour_evening_end),
    );

    if let Some(phase) = w.phase_at(&now) {
        println!("  Now: {phase}");
    }
}

fn score_text(score: &SkyQualityScore) -> String {
    format!("{} ({}/100)", score.label, score.score)
}
